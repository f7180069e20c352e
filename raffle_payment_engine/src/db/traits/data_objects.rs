use thiserror::Error;

use crate::db_types::{Order, OrderId};

#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// An order with this order id already exists. Nothing was written.
    AlreadyExists(OrderId),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored data is corrupt: {0}")]
    CorruptData(String),
}
