//! Collegium event bus.
//!
//! The scheduling engine does not deliver notifications itself; it makes
//! conflict reports and bulk-operation lifecycle transitions observable
//! on an in-process publish/subscribe bus so an external notifier can
//! react to them.

pub mod bus;

pub use bus::{EventBus, PlatformEvent};
