//! Scheduling primitives
//!
//! Timers that decide when queued work runs.

pub mod throttle;

pub use throttle::Throttle;
