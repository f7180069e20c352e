use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::InsertOrderResult},
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
};

const ORDER_COLUMNS: &str = "id, order_id, raffle_id, quantity, unit_price, amount, currency, status, \
                             gateway_resource_path, created_at, updated_at";

/// Inserts a new order in the `created` state. A clash on the unique `order_id` is reported as
/// [`InsertOrderResult::AlreadyExists`] rather than as an error.
pub async fn insert_order(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, SqliteDatabaseError> {
    let q = format!(
        "INSERT INTO orders (order_id, raffle_id, quantity, unit_price, amount, currency, status, created_at, \
         updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {ORDER_COLUMNS}"
    );
    let result = sqlx::query_as::<_, Order>(&q)
        .bind(&order.order_id)
        .bind(&order.raffle_id)
        .bind(order.quantity)
        .bind(order.unit_price)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(OrderStatusType::Created)
        .bind(order.created_at)
        .bind(order.created_at)
        .fetch_one(conn)
        .await;
    match result {
        Ok(order) => {
            debug!("🗃️ Order {} has been saved with id {}", order.order_id, order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("🗃️ Order id {} is already taken", order.order_id);
            Ok(InsertOrderResult::AlreadyExists(order.order_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?");
    let order = sqlx::query_as::<_, Order>(&q).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_resource_path(
    resource_path: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE gateway_resource_path = ?");
    let order = sqlx::query_as::<_, Order>(&q).bind(resource_path).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_orders_by_status(
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let q = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status IN ({}) ORDER BY created_at ASC, id ASC",
        placeholders(statuses.len())
    );
    let mut query = sqlx::query_as::<_, Order>(&q);
    for status in statuses {
        query = query.bind(*status);
    }
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ {} orders with status in {statuses:?}", orders.len());
    Ok(orders)
}

/// Records the gateway resource path and moves the order from `created` to `awaiting_gateway` in one statement.
pub async fn attach_gateway_session(
    order_id: &OrderId,
    resource_path: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!(
        "UPDATE orders SET status = ?, gateway_resource_path = ?, updated_at = ? WHERE order_id = ? AND status = ? \
         RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&q)
        .bind(OrderStatusType::AwaitingGateway)
        .bind(resource_path)
        .bind(Utc::now())
        .bind(order_id)
        .bind(OrderStatusType::Created)
        .fetch_optional(conn)
        .await?;
    match &order {
        Some(o) => debug!("🗃️ Order {order_id} is awaiting gateway payment at {}", resource_path_of(o)),
        None => debug!("🗃️ Order {order_id} was not in the created state. Gateway session not attached"),
    }
    Ok(order)
}

/// The compare-and-set at the heart of reconciliation. The status only changes if it is currently one of `from`;
/// zero affected rows means another caller won the race, and `None` is returned.
pub async fn transition_order_status(
    order_id: &OrderId,
    from: &[OrderStatusType],
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    if from.is_empty() {
        return Ok(None);
    }
    let needs_path =
        if to == OrderStatusType::Succeeded { " AND gateway_resource_path IS NOT NULL" } else { "" };
    let q = format!(
        "UPDATE orders SET status = ?, updated_at = ? WHERE order_id = ? AND status IN ({}){needs_path} RETURNING \
         {ORDER_COLUMNS}",
        placeholders(from.len())
    );
    let mut query = sqlx::query_as::<_, Order>(&q).bind(to).bind(Utc::now()).bind(order_id);
    for status in from {
        query = query.bind(*status);
    }
    let order = query.fetch_optional(conn).await?;
    match &order {
        Some(_) => debug!("🗃️ Order {order_id} moved to {to}"),
        None => trace!("🗃️ Order {order_id} was not in any of {from:?}. Not moved to {to}"),
    }
    Ok(order)
}

fn resource_path_of(order: &Order) -> &str {
    order.gateway_resource_path.as_deref().unwrap_or("<none>")
}

pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
