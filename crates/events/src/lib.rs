//! Augur lifecycle event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`LifecycleEvent`]: the event envelope published as jobs start,
//!   finish, get promoted or get evicted.
//! - [`EventLogger`]: background subscriber that writes every event to the
//!   tracing log.

pub mod bus;
pub mod logger;

pub use bus::{EventBus, LifecycleEvent};
pub use logger::EventLogger;
