use std::fmt::Display;

use raffle_payment_engine::{
    db_types::{Order, Role},
    GatewaySession,
};
use rpg_common::Money;
use serde::{Deserialize, Serialize};

/// A request to buy raffle tickets. Any amount the client sends is ignored; the amount is always computed from
/// the quantity and the unit price.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    pub raffle_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Everything the client needs to render the payment form for an order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub session: GatewaySession,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "resourcePath")]
    pub resource_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub user_id: String,
    #[serde(default)]
    pub apply: Vec<Role>,
    #[serde(default)]
    pub revoke: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}
