//! Log DTOs posted to the ingestion API

use serde::{Serialize, Serializer};

use crate::domain::log::LogEntry;

/// Body of a single log request
///
/// - `Single` is sent as the entry object itself
/// - `Batch` is sent as `[{ "logs": [entry, ...] }]`
#[derive(Debug, Clone, PartialEq)]
pub enum LogPayload {
    Single(LogEntry),
    Batch(Vec<LogEntry>),
}

impl LogPayload {
    /// Number of entries carried by this payload
    pub fn len(&self) -> usize {
        match self {
            LogPayload::Single(_) => 1,
            LogPayload::Batch(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the payload, yielding its entries in send order
    pub fn into_entries(self) -> Vec<LogEntry> {
        match self {
            LogPayload::Single(entry) => vec![entry],
            LogPayload::Batch(entries) => entries,
        }
    }

    /// Entries in send order
    pub fn entries(&self) -> &[LogEntry] {
        match self {
            LogPayload::Single(entry) => std::slice::from_ref(entry),
            LogPayload::Batch(entries) => entries,
        }
    }
}

impl Serialize for LogPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogPayload::Single(entry) => entry.serialize(serializer),
            LogPayload::Batch(entries) => [LogBatchRef { logs: entries }].serialize(serializer),
        }
    }
}

#[derive(Serialize)]
struct LogBatchRef<'a> {
    logs: &'a [LogEntry],
}
