//! Dispatcher service
//!
//! Accepts log payloads and ships them to the ingestion API, either one
//! request per entry (immediate mode) or in throttled batches (batch mode).
//!
//! Batch mode flow:
//! - `log()` normalizes the entry, appends it to the pending queue and
//!   acknowledges the caller right away
//! - the first entry of a window arms a trailing-edge throttle; when the
//!   window elapses the whole queue is drained and posted as one request
//! - reaching `batch_size` drains and posts immediately and cancels the
//!   pending window
//! - every drained entry produces a `logged` event on success, a failed
//!   request produces a single `error` event; entries are never retried

use relic_client::IngestClient;
use relic_core::domain::log::LogEntry;
use relic_core::dto::log::LogPayload;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, trace, warn};

use crate::config::{BatchConfig, DEFAULT_EVENT_CAPACITY, DispatchMode, TransportOptions};
use crate::error::{ConfigError, DispatchError};
use crate::event::DispatchEvent;
use crate::repository::{HttpLogRepository, LogRepository};
use crate::scheduler::Throttle;
use crate::service::log_buffer::{InMemoryLogBuffer, LogBufferService};

/// Completion of a single `log()` call
///
/// Immediate mode resolves once the send settled; batch mode resolves as soon
/// as the entry is queued. The send itself does not depend on this future
/// being polled.
pub type Completion = Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + 'static>>;

/// Log dispatcher
///
/// Cheap to clone; clones share the same queue, throttle and event channel.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.inner.mode)
            .finish_non_exhaustive()
    }
}

struct Inner {
    mode: DispatchMode,
    repository: Arc<dyn LogRepository>,
    batching: Option<Batching>,
    events: broadcast::Sender<DispatchEvent>,
    in_flight: Arc<watch::Sender<usize>>,
}

struct Batching {
    config: BatchConfig,
    buffer: InMemoryLogBuffer,
    throttle: Throttle,
}

impl Dispatcher {
    /// Creates a dispatcher posting to the ingestion API described by `options`
    ///
    /// The batching settings are resolved and checked before anything else,
    /// so an invalid batch size or window never builds an HTTP client.
    pub fn new(options: TransportOptions) -> Result<Self, ConfigError> {
        let mode = DispatchMode::resolve(&options)?;
        options.validate()?;

        let client = IngestClient::new(options.transport_config())?;
        debug!(
            "Dispatcher for {} ready in {:?} mode",
            client.base_url(),
            mode
        );

        Ok(Self::build(
            mode,
            Arc::new(HttpLogRepository::new(client)),
            options.event_capacity,
        ))
    }

    /// Creates a dispatcher on top of any repository
    pub fn with_repository(mode: DispatchMode, repository: Arc<dyn LogRepository>) -> Self {
        Self::build(mode, repository, DEFAULT_EVENT_CAPACITY)
    }

    fn build(
        mode: DispatchMode,
        repository: Arc<dyn LogRepository>,
        event_capacity: usize,
    ) -> Self {
        // A flush emits one event per entry back to back, so a subscriber
        // reading between flushes must be able to hold a whole batch
        let capacity = match mode {
            DispatchMode::Immediate => event_capacity,
            DispatchMode::Batch(config) => event_capacity.max(config.batch_size()),
        };
        let (events, _) = broadcast::channel(capacity.max(1));

        let batching = match mode {
            DispatchMode::Immediate => None,
            DispatchMode::Batch(config) => Some(Batching {
                config,
                buffer: InMemoryLogBuffer::new(),
                throttle: Throttle::new(config.batch_throttle()),
            }),
        };

        Self {
            inner: Arc::new(Inner {
                mode,
                repository,
                batching,
                events,
                in_flight: Arc::new(watch::Sender::new(0)),
            }),
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.inner.mode
    }

    /// Subscribes to `logged` and `error` events
    ///
    /// Only events sent after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.inner.events.subscribe()
    }

    /// Number of queued entries waiting for the next flush
    pub fn pending(&self) -> usize {
        self.inner
            .batching
            .as_ref()
            .map_or(0, |batching| batching.buffer.len())
    }

    /// Number of requests currently in flight
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.borrow()
    }

    /// Waits until no request is in flight
    ///
    /// Entries still queued are not sent; call [`Dispatcher::flush`] first to
    /// wait for everything submitted so far.
    pub async fn settled(&self) {
        let mut in_flight = self.inner.in_flight.subscribe();
        // The sender lives in `self`, the channel cannot close while waiting
        let _ = in_flight.wait_for(|count| *count == 0).await;
    }

    /// Submits a log payload
    ///
    /// The payload is normalized first (see [`LogEntry::from_value`]). Queueing
    /// in batch mode, and the request in immediate mode, are committed before
    /// this returns: the request already counts in [`Dispatcher::in_flight`]
    /// and runs on its own task. Awaiting the [`Completion`] only observes the
    /// outcome.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn log(&self, payload: impl Into<Value>) -> Completion {
        let entry = LogEntry::from_value(payload.into());

        match &self.inner.batching {
            None => {
                let request = InFlight::start(&self.inner.in_flight);
                let inner = Arc::clone(&self.inner);
                let send = tokio::spawn(async move { inner.send_single(entry, request).await });
                Box::pin(async move {
                    send.await.unwrap_or_else(|e| {
                        Err(DispatchError::submission(format!("send task failed: {}", e)))
                    })
                })
            }
            Some(batching) => Box::pin(std::future::ready(self.enqueue(batching, entry))),
        }
    }

    /// Sends everything queued right now
    ///
    /// Cancels the pending throttle window and posts the queue as one batch.
    /// A no-op in immediate mode or when nothing is queued.
    ///
    /// # Returns
    /// The number of entries sent
    pub async fn flush(&self) -> Result<usize, DispatchError> {
        let Some(batching) = &self.inner.batching else {
            return Ok(0);
        };

        batching.throttle.cancel();

        let entries = batching.buffer.drain().inspect_err(|err| {
            self.inner.emit(DispatchEvent::Error(err.clone()));
        })?;

        if entries.is_empty() {
            return Ok(0);
        }

        let count = entries.len();
        let request = InFlight::start(&self.inner.in_flight);
        self.inner
            .post_batch(entries, request)
            .await
            .map(|()| count)
    }

    fn enqueue(&self, batching: &Batching, entry: LogEntry) -> Result<(), DispatchError> {
        match batching.buffer.add_entry(entry, batching.config.batch_size()) {
            Ok(Some(batch)) => {
                debug!("Batch size reached, flushing {} entries now", batch.len());
                batching.throttle.cancel();

                let request = InFlight::start(&self.inner.in_flight);
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    // Outcome is reported through events
                    let _ = inner.post_batch(batch, request).await;
                });
            }
            Ok(None) => {
                let inner = Arc::clone(&self.inner);
                if batching
                    .throttle
                    .trigger(async move { inner.flush_pending().await })
                {
                    trace!(
                        "Armed flush window of {:?}",
                        batching.config.batch_throttle()
                    );
                }
            }
            Err(err) => {
                warn!("Failed to queue log entry: {}", err);
                self.inner.emit(DispatchEvent::Error(err.clone()));
                return Err(err);
            }
        }

        Ok(())
    }
}

impl Inner {
    async fn send_single(&self, entry: LogEntry, request: InFlight) -> Result<(), DispatchError> {
        let payload = LogPayload::Single(entry);

        let result = self.repository.send_logs(&payload).await;
        drop(request);

        match result {
            Ok(()) => {
                for entry in payload.into_entries() {
                    self.emit(DispatchEvent::Logged(entry));
                }
                Ok(())
            }
            Err(err) => {
                let err = DispatchError::from(err);
                warn!("Failed to send log entry: {}", err);
                self.emit(DispatchEvent::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Throttle window elapsed: drain whatever accumulated and send it
    async fn flush_pending(&self) {
        let Some(batching) = &self.batching else {
            return;
        };

        match batching.buffer.drain() {
            Ok(entries) if entries.is_empty() => trace!("No logs to flush"),
            Ok(entries) => {
                let request = InFlight::start(&self.in_flight);
                let _ = self.post_batch(entries, request).await;
            }
            Err(err) => {
                error!("Failed to drain log buffer: {}", err);
                self.emit(DispatchEvent::Error(err));
            }
        }
    }

    async fn post_batch(
        &self,
        entries: Vec<LogEntry>,
        request: InFlight,
    ) -> Result<(), DispatchError> {
        let count = entries.len();
        debug!("Flushing {} log entries", count);

        let payload = LogPayload::Batch(entries);

        let result = self.repository.send_logs(&payload).await;
        drop(request);

        match result {
            Ok(()) => {
                debug!("Successfully flushed {} log entries", count);
                for entry in payload.into_entries() {
                    self.emit(DispatchEvent::Logged(entry));
                }
                Ok(())
            }
            Err(err) => {
                let err = DispatchError::from(err);
                error!("Failed to flush {} log entries: {}", count, err);
                self.emit(DispatchEvent::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn emit(&self, event: DispatchEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Counts one request from the moment it is decided until it settles
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn start(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|count| *count += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}
