pub mod auth_api;
pub mod errors;
pub mod media_api;
pub mod order_flow_api;
pub mod reconciliation_api;
pub mod settings_api;
