use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::PaymentGatewayDatabase,
    db_types::{Order, OrderId, OrderStatusType, PaymentSettings},
    events::{EventProducers, OrderFailedEvent, OrderSucceededEvent},
    gateway::{GatewayError, GatewayStatus, PaymentGatewayClient, PaymentOutcome},
    rpe_api::errors::OrderFlowError,
};

/// The outcome of a reconciliation sweep over all outstanding orders.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    pub checked: usize,
    pub succeeded: Vec<Order>,
    pub failed: Vec<Order>,
    pub errors: usize,
}

impl SweepResult {
    pub fn still_outstanding(&self) -> usize {
        self.checked.saturating_sub(self.succeeded.len() + self.failed.len() + self.errors)
    }
}

/// The Status Reconciler.
///
/// Maps gateway status onto order state. Every transition goes through the storage compare-and-set, so when several
/// callers reconcile the same order at once (the shopper's browser polling, the status endpoint and the background
/// sweep, say), exactly one of them moves the order into its terminal state, and only that caller publishes the
/// downstream event. The others return the stored order.
///
/// | Current \ Gateway says | success   | failure | pending | unknown |
/// |------------------------|-----------|---------|---------|---------|
/// | awaiting_gateway       | succeeded | failed  | pending | pending |
/// | pending                | succeeded | failed  | -       | -       |
/// | created, terminal      | -         | -       | -       | -       |
pub struct ReconciliationApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for ReconciliationApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B, G> ReconciliationApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, G> ReconciliationApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
{
    /// Brings the order up to date with the gateway.
    ///
    /// Terminal orders, and orders that never reached the gateway, are returned unchanged without any outbound call.
    /// Calling this repeatedly is safe.
    pub async fn reconcile(&self, order_id: &OrderId, settings: &PaymentSettings) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        self.reconcile_order(order, settings).await
    }

    async fn reconcile_order(&self, order: Order, settings: &PaymentSettings) -> Result<Order, OrderFlowError> {
        if order.status.is_terminal() {
            trace!("🧾️ Order {} is already {}. Nothing to reconcile", order.order_id, order.status);
            return Ok(order);
        }
        let Some(resource_path) = order.gateway_resource_path.clone() else {
            trace!("🧾️ Order {} has no gateway transaction yet. Nothing to reconcile", order.order_id);
            return Ok(order);
        };
        if !settings.datafast.enabled {
            return Err(GatewayError::Disabled.into());
        }
        let status = self.gateway.fetch_status(&resource_path, &settings.datafast).await?;
        self.apply_gateway_status(order, &status).await
    }

    /// Applies a gateway status to the order. See the table in the type documentation for the transitions.
    ///
    /// Returns the order as it is stored after the call, whether or not this caller changed it.
    pub async fn apply_gateway_status(&self, order: Order, status: &GatewayStatus) -> Result<Order, OrderFlowError> {
        use OrderStatusType::*;
        let oid = &order.order_id;
        let (from, to): (&[OrderStatusType], OrderStatusType) = match status.outcome {
            PaymentOutcome::Succeeded => (OrderStatusType::AWAITING_RESULT, Succeeded),
            PaymentOutcome::SucceededNeedsReview => {
                warn!(
                    "🧾️ Payment for order {oid} succeeded, but the gateway flagged it for manual review. {} {}",
                    status.code, status.description
                );
                (OrderStatusType::AWAITING_RESULT, Succeeded)
            },
            PaymentOutcome::Failed => (OrderStatusType::AWAITING_RESULT, Failed),
            PaymentOutcome::Pending => (OrderStatusType::AWAITING_GATEWAY, Pending),
            PaymentOutcome::Unknown => {
                warn!(
                    "🧾️ Unrecognised result code {} ({}) for order {oid}. Treating it as pending",
                    status.code, status.description
                );
                (OrderStatusType::AWAITING_GATEWAY, Pending)
            },
        };
        if order.status == to {
            trace!("🧾️ Order {oid} is already {to}");
            return Ok(order);
        }
        match self.db.transition_order_status(oid, from, to).await? {
            Some(updated) => {
                info!("🧾️ Order {oid}: {} -> {to} (gateway result {})", order.status, status.code);
                self.notify(&updated, status).await;
                Ok(updated)
            },
            None => {
                let current = self
                    .db
                    .fetch_order_by_order_id(oid)
                    .await?
                    .ok_or_else(|| OrderFlowError::OrderNotFound(oid.clone()))?;
                debug!("🧾️ Order {oid} is {}. Gateway result {} not applied", current.status, status.code);
                Ok(current)
            },
        }
    }

    async fn notify(&self, order: &Order, status: &GatewayStatus) {
        match order.status {
            OrderStatusType::Succeeded => {
                self.producers.publish_order_succeeded(OrderSucceededEvent::new(order.clone())).await;
            },
            OrderStatusType::Failed => {
                let reason = format!("{} {}", status.code, status.description);
                self.producers.publish_order_failed(OrderFailedEvent::new(order.clone(), reason)).await;
            },
            _ => {},
        }
    }

    /// Checks that the resource path is one we would ever query. Never makes an outbound call.
    pub fn validate_resource_path(&self, resource_path: &str) -> Result<(), OrderFlowError> {
        Ok(self.gateway.validate_resource_path(resource_path)?)
    }

    /// Fetches the status at `resource_path` and, if one of our orders owns that path, applies it to the order.
    ///
    /// The gateway status is returned even if the order could not be updated; such orders are picked up again by
    /// the next sweep.
    pub async fn check_resource_path(
        &self,
        resource_path: &str,
        settings: &PaymentSettings,
    ) -> Result<(GatewayStatus, Option<Order>), OrderFlowError> {
        self.validate_resource_path(resource_path)?;
        if !settings.datafast.enabled {
            return Err(GatewayError::Disabled.into());
        }
        let status = self.gateway.fetch_status(resource_path, &settings.datafast).await?;
        debug!("🧾️ {resource_path} reports {} ({})", status.code, status.outcome);
        let order = self.apply_to_owner(resource_path, &status).await;
        Ok((status, order))
    }

    async fn apply_to_owner(&self, resource_path: &str, status: &GatewayStatus) -> Option<Order> {
        let order = match self.db.fetch_order_by_resource_path(resource_path).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                debug!("🧾️ No order owns {resource_path}");
                return None;
            },
            Err(e) => {
                error!("🧾️ Could not look up the order for {resource_path}. {e}");
                return None;
            },
        };
        if order.status.is_terminal() {
            return Some(order);
        }
        let oid = order.order_id.clone();
        match self.apply_gateway_status(order, status).await {
            Ok(order) => Some(order),
            Err(e) => {
                error!("🧾️ Could not apply gateway status {} to order {oid}. {e}", status.code);
                None
            },
        }
    }

    /// Reconciles every order that is waiting on the gateway. Failures on individual orders are logged and counted,
    /// and do not stop the sweep.
    pub async fn reconcile_outstanding(&self, settings: &PaymentSettings) -> Result<SweepResult, OrderFlowError> {
        if !settings.datafast.enabled {
            return Err(GatewayError::Disabled.into());
        }
        let outstanding = self.db.fetch_orders_by_status(OrderStatusType::AWAITING_RESULT).await?;
        let mut result = SweepResult { checked: outstanding.len(), ..Default::default() };
        for order in outstanding {
            let oid = order.order_id.clone();
            match self.reconcile_order(order, settings).await {
                Ok(order) if order.status == OrderStatusType::Succeeded => result.succeeded.push(order),
                Ok(order) if order.status == OrderStatusType::Failed => result.failed.push(order),
                Ok(_) => {},
                Err(e) => {
                    warn!("🧾️ Could not reconcile order {oid}. {e}");
                    result.errors += 1;
                },
            }
        }
        Ok(result)
    }
}
