//! # DataFast gateway client
//!
//! DataFast runs on the OPPWA platform. A card payment takes two round trips:
//! 1. The server opens a checkout (`POST /v1/checkouts`) and hands the checkout id to the payment widget.
//! 2. After the shopper completes the widget, the gateway redirects back with a `resourcePath`, which the server polls
//!    (`GET <resourcePath>?entityId=...`) to learn the outcome.
//!
//! This crate knows nothing about orders. It only speaks the gateway's wire format and classifies its result codes.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;
mod result_codes;

pub use api::DataFastApi;
pub use config::{DataFastConfig, DataFastCredentials, Environment};
pub use data_objects::{CheckoutRequest, CheckoutResponse, ResultInfo, StatusResponse};
pub use error::DataFastApiError;
pub use helpers::{checkout_resource_path, validate_checkout_id, validate_resource_path};
pub use result_codes::{classify_result_code, ResultCategory};
