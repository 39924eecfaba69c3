//! Dispatcher events
//!
//! Every send outcome is broadcast to subscribers, independently of the
//! result handed back to whoever submitted the entry.

use relic_core::domain::log::LogEntry;

use crate::error::DispatchError;

/// Outcome notification of a send
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// An entry was accepted by the ingestion API (one event per entry)
    Logged(LogEntry),
    /// A send failed (one event per failed request)
    Error(DispatchError),
}

impl DispatchEvent {
    /// Event name, `"logged"` or `"error"`
    pub fn name(&self) -> &'static str {
        match self {
            DispatchEvent::Logged(_) => "logged",
            DispatchEvent::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DispatchEvent::Error(_))
    }
}
