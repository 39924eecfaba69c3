//! Log buffer service
//!
//! Holds the pending queue of a batching dispatcher. Entries are appended by
//! the submission path and only ever removed all at once by the flush path.

use relic_core::domain::log::LogEntry;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::DispatchError;

/// Service for managing the pending queue
pub trait LogBufferService: Send + Sync {
    /// Adds a log entry to the buffer
    ///
    /// # Arguments
    /// * `entry` - The log entry to add
    /// * `flush_at` - Queue length that triggers a flush
    ///
    /// # Returns
    /// The whole queue, drained in insertion order, when the new length
    /// reached `flush_at`; `None` otherwise. Appending and draining happen
    /// under one lock, so a forced batch never holds more than `flush_at`
    /// entries.
    fn add_entry(
        &self,
        entry: LogEntry,
        flush_at: usize,
    ) -> Result<Option<Vec<LogEntry>>, DispatchError>;

    /// Drains all log entries from the buffer
    ///
    /// Entries added afterwards belong to the next drain.
    fn drain(&self) -> Result<Vec<LogEntry>, DispatchError>;

    /// Number of entries waiting to be sent
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory implementation of LogBufferService
///
/// Uses Arc<Mutex<Vec<LogEntry>>> for thread-safe access across tasks.
#[derive(Clone, Default)]
pub struct InMemoryLogBuffer {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl InMemoryLogBuffer {
    /// Creates a new in-memory log buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Poisons the queue lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let buffer = Arc::clone(&self.buffer);
        let _ = std::thread::spawn(move || {
            let _guard = buffer.lock().unwrap();
            panic!("panicked while holding the log buffer");
        })
        .join();
    }
}

fn poisoned() -> DispatchError {
    DispatchError::submission("log buffer lock poisoned")
}

impl LogBufferService for InMemoryLogBuffer {
    fn add_entry(
        &self,
        entry: LogEntry,
        flush_at: usize,
    ) -> Result<Option<Vec<LogEntry>>, DispatchError> {
        let mut buffer = self.buffer.lock().map_err(|_| poisoned())?;
        buffer.push(entry);

        if buffer.len() >= flush_at {
            Ok(Some(std::mem::take(&mut *buffer)))
        } else {
            Ok(None)
        }
    }

    fn drain(&self) -> Result<Vec<LogEntry>, DispatchError> {
        let mut buffer = self.buffer.lock().map_err(|_| poisoned())?;
        Ok(std::mem::take(&mut *buffer))
    }

    fn len(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
