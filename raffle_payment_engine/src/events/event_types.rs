use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Emitted exactly once, by the caller that moved the order into `succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSucceededEvent {
    pub order: Order,
}

impl OrderSucceededEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted exactly once, by the caller that moved the order into `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailedEvent {
    pub order: Order,
    /// The gateway result code (or local reason) that caused the failure.
    pub reason: String,
}

impl OrderFailedEvent {
    pub fn new(order: Order, reason: impl Into<String>) -> Self {
        Self { order, reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order: Order,
    /// The status the order was in before it was cancelled.
    pub previous_status: OrderStatusType,
}

impl OrderCancelledEvent {
    pub fn new(order: Order, previous_status: OrderStatusType) -> Self {
        Self { order, previous_status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventType {
    OrderSucceeded(OrderSucceededEvent),
    OrderFailed(OrderFailedEvent),
    OrderCancelled(OrderCancelledEvent),
}

impl EventType {
    pub fn name(&self) -> &'static str {
        match self {
            EventType::OrderSucceeded(_) => "order_succeeded",
            EventType::OrderFailed(_) => "order_failed",
            EventType::OrderCancelled(_) => "order_cancelled",
        }
    }

    pub fn order(&self) -> &Order {
        match self {
            EventType::OrderSucceeded(e) => &e.order,
            EventType::OrderFailed(e) => &e.order,
            EventType::OrderCancelled(e) => &e.order,
        }
    }
}

impl From<OrderSucceededEvent> for EventType {
    fn from(e: OrderSucceededEvent) -> Self {
        EventType::OrderSucceeded(e)
    }
}

impl From<OrderFailedEvent> for EventType {
    fn from(e: OrderFailedEvent) -> Self {
        EventType::OrderFailed(e)
    }
}

impl From<OrderCancelledEvent> for EventType {
    fn from(e: OrderCancelledEvent) -> Self {
        EventType::OrderCancelled(e)
    }
}
