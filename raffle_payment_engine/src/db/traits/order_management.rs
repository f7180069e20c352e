use crate::{
    db::traits::StorageError,
    db_types::{Order, OrderId, OrderStatusType},
};

/// The `OrderManagement` trait defines the behaviour for querying information about orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError>;

    /// Fetches the order that owns the given gateway resource path, if any.
    async fn fetch_order_by_resource_path(&self, resource_path: &str) -> Result<Option<Order>, StorageError>;

    /// Fetches all orders currently in any of the given states, oldest first.
    async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, StorageError>;
}
