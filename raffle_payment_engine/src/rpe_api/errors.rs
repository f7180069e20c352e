use rpg_common::Money;
use thiserror::Error;

use crate::{
    db::traits::StorageError,
    db_types::{OrderId, OrderStatusType},
    gateway::GatewayError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Quantity must be a positive whole number, but was {0}")]
    InvalidQuantity(i64),
    #[error("Unit price cannot be negative, but was {0}")]
    InvalidPrice(Money),
    #[error("A raffle id is required")]
    InvalidRaffleId,
    #[error("The order amount is too large")]
    AmountOverflow,
    #[error("Could not allocate a unique order id after {0} attempts")]
    OrderIdExhausted(usize),
    #[error("Order {order_id} is {status}, which does not allow this operation")]
    InvalidOrderState { order_id: OrderId, status: OrderStatusType },
    #[error("{0}")]
    GatewayError(#[from] GatewayError),
}

impl From<StorageError> for OrderFlowError {
    fn from(e: StorageError) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User is missing {0} of the required roles")]
    RoleNotAllowed(usize),
}

#[derive(Debug, Clone, Error)]
pub enum SettingsApiError {
    #[error("Payment settings have not been configured")]
    NotConfigured,
    #[error("Payment settings are invalid: {0}")]
    Invalid(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StorageError> for SettingsApiError {
    fn from(e: StorageError) -> Self {
        SettingsApiError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MediaApiError {
    #[error("{0} is not allowed to manage media")]
    InsufficientPermissions(String),
    #[error("Invalid media record: {0}")]
    ValidationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StorageError> for MediaApiError {
    fn from(e: StorageError) -> Self {
        MediaApiError::DatabaseError(e.to_string())
    }
}
