//! The seam between the engine and a concrete card gateway.
//!
//! The engine never talks HTTP itself. The server injects an implementation of [`PaymentGatewayClient`] (the DataFast
//! bridge in production, fakes in tests), and the engine works purely in terms of [`GatewaySession`] and
//! [`GatewayStatus`].
use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{GatewaySettings, Order};

/// What the gateway returned when a transaction was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewaySession {
    pub checkout_id: String,
    /// The path, relative to the gateway host, at which the payment status can be queried.
    pub resource_path: String,
    /// The script the client embeds to render the payment form.
    pub widget_script_url: String,
}

/// How a gateway result maps onto the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    /// The payment went through, but the gateway flagged it for manual review.
    SucceededNeedsReview,
    Failed,
    Pending,
    /// A result code we don't recognise.
    Unknown,
}

impl Display for PaymentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentOutcome::Succeeded => "succeeded",
            PaymentOutcome::SucceededNeedsReview => "succeeded (needs review)",
            PaymentOutcome::Failed => "failed",
            PaymentOutcome::Pending => "pending",
            PaymentOutcome::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A decoded status response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayStatus {
    pub code: String,
    pub description: String,
    pub outcome: PaymentOutcome,
    /// The gateway response, exactly as received.
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("The payment method is disabled")]
    Disabled,
    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),
    #[error("The gateway is unavailable: {0}")]
    Unavailable(String),
    #[error("The gateway rejected the request with status {status}")]
    Rejected { status: u16, body: String },
    #[error("The gateway returned an unexpected response: {0}")]
    InvalidResponse(String),
}

#[allow(async_fn_in_trait)]
pub trait PaymentGatewayClient {
    /// Checks that a client-supplied resource path is safe to query. Implementations must reject anything that could
    /// send the gateway credential to another host.
    fn validate_resource_path(&self, resource_path: &str) -> Result<(), GatewayError>;

    /// Opens a new transaction for the order. Not idempotent: every call creates a new transaction on the gateway.
    async fn begin_transaction(
        &self,
        order: &Order,
        settings: &GatewaySettings,
    ) -> Result<GatewaySession, GatewayError>;

    async fn fetch_status(&self, resource_path: &str, settings: &GatewaySettings)
        -> Result<GatewayStatus, GatewayError>;
}
