//! # Database management and control.
//!
//! This module provides the interface contracts of the payment engine database *backends* ([`traits`]), and the
//! SQLite backend that the server ships with ([`sqlite`]).
//!
//! You should never need to access the database directly. Use the APIs exposed at the crate root instead. The data
//! types stored in the database are defined in [`crate::db_types`] and are public.
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;
