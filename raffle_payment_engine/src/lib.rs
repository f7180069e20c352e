//! Raffle Payment Engine
//!
//! The core of the raffle ticket payment gateway. It owns the payment order lifecycle and its reconciliation with the
//! card gateway, and it is provider-agnostic: the gateway is reached through the [`PaymentGatewayClient`] trait, and
//! storage through the traits in [`mod@db::traits`].
//!
//! The library is divided into these sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. The exception is the data types stored in the database, which are defined in
//!    [`mod@db_types`] and are public.
//! 2. The public API:
//!    * [`OrderFlowApi`] creates orders, opens gateway transactions and cancels orders.
//!    * [`ReconciliationApi`] applies gateway status to orders, exactly once per terminal transition.
//!    * [`AuthApi`] answers role queries for authenticated principals.
//!    * [`SettingsApi`] and [`MediaApi`] hold the privileged administrative writes.
//!
//! When an order reaches a terminal state, an event is published to the hooks registered in
//! [`events::EventHooks`]. This is how ticket reservation is triggered downstream.
pub mod db;

pub mod db_types;
pub mod events;
pub mod gateway;
pub mod helpers;
mod rpe_api;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{
    InsertOrderResult,
    MediaManagement,
    OrderManagement,
    PaymentGatewayDatabase,
    RoleManagement,
    SettingsManagement,
    StorageError,
};
pub use gateway::{GatewayError, GatewaySession, GatewayStatus, PaymentGatewayClient, PaymentOutcome};
pub use rpe_api::{
    auth_api::AuthApi,
    errors::{AuthApiError, MediaApiError, OrderFlowError, SettingsApiError},
    media_api::MediaApi,
    order_flow_api::{OrderFlowApi, OrderOptions},
    reconciliation_api::{ReconciliationApi, SweepResult},
    settings_api::SettingsApi,
};
