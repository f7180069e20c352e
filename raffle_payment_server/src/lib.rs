//! # Raffle payment server
//! This crate hosts the HTTP server for the raffle ticket payment gateway. It is responsible for:
//! * Creating ticket orders and opening DataFast checkouts for them.
//! * Answering the payment widget's status redirect, and reconciling the matching order with the gateway result.
//! * The administrative surface: payment settings, media records and roles. These routes require an admin bearer
//!   token.
//! * Forwarding order events to the ticket reservation service.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/orders`, `/orders/{order_id}` and `/orders/{order_id}/{checkout,reconcile,cancel}`: The order lifecycle.
//! * `/datafast-status?resourcePath=...`: The gateway status endpoint.
//! * `/media`: The published media records.
//! * `/admin/settings`, `/admin/media`, `/admin/roles`: Admin-only mutations.
//!
//! Every response carries permissive CORS headers, and `OPTIONS` preflight requests are answered directly.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
