//! Forwards order events to the ticket-reservation service.
//!
//! Each event is POSTed as JSON, e.g. `{"event": "order_succeeded", "order": {...}}`. Delivery is best effort: a
//! failed delivery is logged, and the order state is never rolled back because of it.
use std::{future::Future, pin::Pin, time::Duration};

use log::*;
use raffle_payment_engine::events::{EventHooks, EventType};
use reqwest::Client;

use crate::errors::ServerError;

#[derive(Clone)]
pub struct TicketReservationNotifier {
    client: Client,
    url: Option<String>,
}

impl TicketReservationNotifier {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, ServerError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { client, url })
    }

    /// Registers the notifier on every order event.
    pub fn hooks(self) -> EventHooks {
        let mut hooks = EventHooks::default();
        let notifier = self.clone();
        hooks.on_order_succeeded(move |ev| {
            let notifier = notifier.clone();
            Box::pin(async move { notifier.notify(ev.into()).await }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let notifier = self.clone();
        hooks.on_order_failed(move |ev| {
            let notifier = notifier.clone();
            Box::pin(async move { notifier.notify(ev.into()).await }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let notifier = self;
        hooks.on_order_cancelled(move |ev| {
            let notifier = notifier.clone();
            Box::pin(async move { notifier.notify(ev.into()).await }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        hooks
    }

    pub async fn notify(&self, event: EventType) {
        let order = event.order();
        info!("📬️ {} for order {} ({} {})", event.name(), order.order_id, order.amount, order.currency);
        let Some(url) = &self.url else {
            debug!("📬️ No ticket reservation endpoint is configured. {} was not forwarded", event.name());
            return;
        };
        match self.client.post(url).json(&event).send().await {
            Ok(res) if res.status().is_success() => {
                debug!("📬️ {} for order {} delivered to {url}", event.name(), order.order_id);
            },
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                error!("📬️ {url} rejected {} for order {}. {status} {body}", event.name(), order.order_id);
            },
            Err(e) => {
                error!("📬️ Could not deliver {} for order {} to {url}. {e}", event.name(), order.order_id);
            },
        }
    }
}
