//! # Storage contracts
//!
//! These traits define what a database backend must provide to support the raffle payment engine. The engine APIs
//! are generic over them, so that the server and the tests can swap in other backends or mocks.
//!
//! * [`PaymentGatewayDatabase`] holds the order write path. Every state transition is a conditional update, so that
//!   concurrent callers racing on the same order can never both win.
//! * [`OrderManagement`] covers read-only order queries.
//! * [`RoleManagement`] stores role grants for authenticated principals.
//! * [`SettingsManagement`] stores the single payment settings row.
//! * [`MediaManagement`] stores media records created by administrators.
mod data_objects;
mod media_management;
mod order_management;
mod payment_gateway_database;
mod role_management;
mod settings_management;

pub use data_objects::{InsertOrderResult, StorageError};
pub use media_management::MediaManagement;
pub use order_management::OrderManagement;
pub use payment_gateway_database::PaymentGatewayDatabase;
pub use role_management::RoleManagement;
pub use settings_management::SettingsManagement;
