//! Application events and the in-process bus that dispatches them.

pub mod bus;

pub use bus::{Dispatch, Event, EventBus, ListenerMode};
