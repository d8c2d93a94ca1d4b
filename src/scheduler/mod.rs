//! Timer facility - named one-shot timeouts and fixed-period intervals.

pub mod registry;

pub use registry::{millis, SchedulerRegistry, TimerInfo, TimerKind};
