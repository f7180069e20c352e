use crate::{
    db::traits::{InsertOrderResult, OrderManagement, StorageError},
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
};

/// The order write path.
///
/// Every method that changes an order is a compare-and-set: the change is applied in a single statement, only if the
/// order is currently in one of the expected states. A `None` result means that the order was not in an expected
/// state (or does not exist), i.e. somebody else got there first. Callers use this to guarantee that side effects
/// of a transition happen at most once.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order in the `created` state.
    ///
    /// If the order id is already taken, nothing is written and [`InsertOrderResult::AlreadyExists`] is returned.
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StorageError>;

    /// Records the gateway resource path for the order and moves it from `created` to `awaiting_gateway`.
    async fn attach_gateway_session(
        &self,
        order_id: &OrderId,
        resource_path: &str,
    ) -> Result<Option<Order>, StorageError>;

    /// Moves the order to `to`, provided that it is currently in one of the `from` states.
    ///
    /// Transitions into `succeeded` additionally require the order to have a gateway resource path.
    async fn transition_order_status(
        &self,
        order_id: &OrderId,
        from: &[OrderStatusType],
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}
