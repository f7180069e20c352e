//! Downstream notifications for order state changes.
//!
//! Components subscribe by registering async closures in [`EventHooks`]. Each hook gets its own channel and worker
//! ([`EventHandlers`]); the engine APIs publish through the cloned [`EventProducers`].
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
