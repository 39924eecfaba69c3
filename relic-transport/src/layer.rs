//! Tracing bridge
//!
//! A [`tracing_subscriber::Layer`] that turns every `tracing` event into a log
//! entry and hands it to a [`Dispatcher`]. Event fields become entry fields,
//! the formatted message lands under `message`.
//!
//! Events emitted by this crate and by the HTTP stack are skipped, otherwise
//! each send would log about itself.

use relic_core::domain::log::{LEVEL_KEY, LogLevel};
use serde_json::{Map, Value};
use std::fmt;
use tokio::runtime::Handle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::service::Dispatcher;

const TARGET_KEY: &str = "target";

const INTERNAL_TARGETS: &[&str] = &[
    "relic_core",
    "relic_client",
    "relic_transport",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tower",
];

/// Forwards tracing events to a dispatcher
pub struct IngestLayer {
    dispatcher: Dispatcher,
    handle: Handle,
}

impl IngestLayer {
    /// Creates the layer
    ///
    /// # Arguments
    /// * `dispatcher` - Where entries are submitted
    /// * `handle` - Runtime used for the sends, events may come from any thread
    pub fn new(dispatcher: Dispatcher, handle: Handle) -> Self {
        Self { dispatcher, handle }
    }
}

impl<S: Subscriber> Layer<S> for IngestLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) {
            return;
        }

        let mut fields = Map::new();
        event.record(&mut FieldVisitor {
            fields: &mut fields,
        });

        fields.insert(
            LEVEL_KEY.to_string(),
            Value::from(level_of(metadata.level()).as_str()),
        );
        fields
            .entry(TARGET_KEY)
            .or_insert_with(|| Value::from(metadata.target()));

        let _guard = self.handle.enter();
        // Outcome is reported through dispatcher events
        drop(self.dispatcher.log(Value::Object(fields)));
    }
}

fn is_internal(target: &str) -> bool {
    INTERNAL_TARGETS.iter().any(|internal| {
        target
            .strip_prefix(internal)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

fn level_of(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        Level::DEBUG => LogLevel::Debug,
        Level::TRACE => LogLevel::Silly,
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Map<String, Value>,
}

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchConfig, DispatchMode};
    use crate::repository::memory::RecordingRepository;
    use serde_json::json;
    use std::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_internal_targets() {
        assert!(is_internal("relic_transport"));
        assert!(is_internal("relic_transport::service::dispatcher"));
        assert!(is_internal("hyper_util::client::legacy"));
        assert!(!is_internal("checkout"));
        assert!(!is_internal("hyperdrive"));
    }

    #[test]
    fn test_levels() {
        assert_eq!(level_of(&Level::WARN), LogLevel::Warn);
        assert_eq!(level_of(&Level::TRACE), LogLevel::Silly);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_become_entries() {
        let repository = RecordingRepository::new();
        let mode = DispatchMode::Batch(BatchConfig::new(100, Duration::from_secs(1)).unwrap());
        let dispatcher = Dispatcher::with_repository(mode, repository.clone());

        let subscriber = tracing_subscriber::registry()
            .with(IngestLayer::new(dispatcher.clone(), Handle::current()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "checkout", order_id = 42, paid = true, "order placed");
            tracing::debug!(target: "relic_transport::service", "internal chatter");
            tracing::warn!(target: "hyper::client", "pool idle");
        });

        assert_eq!(dispatcher.pending(), 1);
        assert_eq!(dispatcher.flush().await.unwrap(), 1);

        let sent = repository.sent();
        let entry = &sent[0].entries()[0];
        assert_eq!(entry.message(), Some("order placed"));
        assert_eq!(entry.level(), Some("info"));
        assert_eq!(entry.get("order_id"), Some(&json!(42)));
        assert_eq!(entry.get("paid"), Some(&json!(true)));
        assert_eq!(entry.get("target"), Some(&json!("checkout")));
        assert!(entry.timestamp().is_some());
    }
}
