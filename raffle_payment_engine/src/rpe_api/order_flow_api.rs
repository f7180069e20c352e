use std::fmt::Debug;

use chrono::Utc;
use log::*;
use rpg_common::{Money, DEFAULT_CURRENCY_CODE};

use crate::{
    db::traits::{InsertOrderResult, PaymentGatewayDatabase},
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentSettings},
    events::{EventProducers, OrderCancelledEvent, OrderFailedEvent},
    gateway::{GatewayError, GatewaySession, PaymentGatewayClient},
    helpers::generate_order_id,
    rpe_api::errors::OrderFlowError,
};

const MAX_ORDER_ID_ATTEMPTS: usize = 5;

/// Static parameters applied to every new order.
#[derive(Debug, Clone)]
pub struct OrderOptions {
    pub currency: String,
    pub order_id_prefix: String,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self { currency: DEFAULT_CURRENCY_CODE.to_string(), order_id_prefix: "RF".to_string() }
    }
}

/// `OrderFlowApi` is the Order Manager. It creates orders, opens gateway transactions for them and cancels them.
///
/// Status updates coming back from the gateway are handled by [`crate::ReconciliationApi`].
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
    options: OrderOptions,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.options)
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers, options: OrderOptions) -> Self {
        Self { db, gateway, producers, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
{
    /// Creates a new order in the `created` state.
    ///
    /// The amount is always computed here, from the quantity and unit price. The order id is generated, and
    /// regenerated if it happens to clash with an existing order.
    pub async fn create_order(&self, raffle_id: &str, quantity: i64, unit_price: Money) -> Result<Order, OrderFlowError> {
        let raffle_id = raffle_id.trim();
        if raffle_id.is_empty() {
            return Err(OrderFlowError::InvalidRaffleId);
        }
        if quantity <= 0 {
            return Err(OrderFlowError::InvalidQuantity(quantity));
        }
        if unit_price.is_negative() {
            return Err(OrderFlowError::InvalidPrice(unit_price));
        }
        let amount = unit_price.checked_mul(quantity).ok_or(OrderFlowError::AmountOverflow)?;
        for attempt in 1..=MAX_ORDER_ID_ATTEMPTS {
            let order = NewOrder {
                order_id: generate_order_id(&self.options.order_id_prefix),
                raffle_id: raffle_id.to_string(),
                quantity,
                unit_price,
                amount,
                currency: self.options.currency.clone(),
                created_at: Utc::now(),
            };
            match self.db.insert_order(order).await? {
                InsertOrderResult::Inserted(order) => {
                    info!(
                        "🔄️📦️ Order {} created: {quantity} tickets for raffle {raffle_id} at {unit_price}. Total {} {}",
                        order.order_id, order.amount, order.currency
                    );
                    return Ok(order);
                },
                InsertOrderResult::AlreadyExists(oid) => {
                    warn!("🔄️📦️ Order id {oid} is already taken (attempt {attempt}). Generating a new one");
                },
            }
        }
        error!("🔄️📦️ Could not allocate a unique order id after {MAX_ORDER_ID_ATTEMPTS} attempts");
        Err(OrderFlowError::OrderIdExhausted(MAX_ORDER_ID_ATTEMPTS))
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_order_id(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
    }

    /// Opens a gateway transaction for an order in the `created` state.
    ///
    /// * If the payment method is disabled, no call is made and [`GatewayError::Disabled`] is returned.
    /// * On success, the order moves to `awaiting_gateway` and the resource path is recorded in the same update.
    /// * If the gateway cannot open the transaction, the order is marked `failed` and the error is returned. The
    ///   initiation call is never retried on the same order; the shopper starts a fresh order instead.
    pub async fn begin_checkout(
        &self,
        order_id: &OrderId,
        settings: &PaymentSettings,
    ) -> Result<(Order, GatewaySession), OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        if order.status != OrderStatusType::Created {
            debug!("🔄️💳️ Order {order_id} is {}. Refusing to open a checkout", order.status);
            return Err(OrderFlowError::InvalidOrderState { order_id: order.order_id, status: order.status });
        }
        if !settings.datafast.enabled {
            info!("🔄️💳️ Checkout for {order_id} refused. The payment method is disabled");
            return Err(GatewayError::Disabled.into());
        }
        match self.gateway.begin_transaction(&order, &settings.datafast).await {
            Ok(session) => self.attach_session(order, session).await,
            Err(e) => {
                warn!("🔄️💳️ Could not open a checkout for {order_id}. {e}");
                self.fail_order(order_id, e.to_string()).await?;
                let e = match e {
                    GatewayError::Rejected { status, body } => {
                        GatewayError::Unavailable(format!("checkout initiation returned {status}: {body}"))
                    },
                    e => e,
                };
                Err(e.into())
            },
        }
    }

    async fn attach_session(
        &self,
        order: Order,
        session: GatewaySession,
    ) -> Result<(Order, GatewaySession), OrderFlowError> {
        let updated = self.db.attach_gateway_session(&order.order_id, &session.resource_path).await?;
        match updated {
            Some(order) => {
                info!("🔄️💳️ Order {} is awaiting payment at {}", order.order_id, session.resource_path);
                Ok((order, session))
            },
            None => {
                // The order changed state while the gateway call was in flight (e.g. it was cancelled).
                let current = self.fetch_order(&order.order_id).await?;
                warn!(
                    "🔄️💳️ Order {} moved to {} while its checkout was being opened. Checkout {} is abandoned",
                    current.order_id, current.status, session.checkout_id
                );
                Err(OrderFlowError::InvalidOrderState { order_id: current.order_id, status: current.status })
            },
        }
    }

    async fn fail_order(&self, order_id: &OrderId, reason: String) -> Result<(), OrderFlowError> {
        let failed =
            self.db.transition_order_status(order_id, &[OrderStatusType::Created], OrderStatusType::Failed).await?;
        if let Some(order) = failed {
            info!("🔄️💳️ Order {order_id} marked as failed");
            self.producers.publish_order_failed(OrderFailedEvent::new(order, reason)).await;
        }
        Ok(())
    }

    /// Cancels an order that has not reached a terminal state. Cancelling a terminal order is a no-op that returns
    /// the order unchanged.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        if order.status.is_terminal() {
            debug!("🔄️❌️ Order {order_id} is already {}. Nothing to cancel", order.status);
            return Ok(order);
        }
        let cancelled = self
            .db
            .transition_order_status(order_id, OrderStatusType::NON_TERMINAL, OrderStatusType::Cancelled)
            .await?;
        match cancelled {
            Some(updated) => {
                info!("🔄️❌️ Order {order_id} cancelled (was {})", order.status);
                self.producers.publish_order_cancelled(OrderCancelledEvent::new(updated.clone(), order.status)).await;
                Ok(updated)
            },
            None => {
                let current = self.fetch_order(order_id).await?;
                debug!("🔄️❌️ Order {order_id} reached {} before it could be cancelled", current.status);
                Ok(current)
            },
        }
    }
}
