//! Relic Transport
//!
//! Ships structured log entries to a log ingestion API.
//!
//! A [`Dispatcher`] runs in one of two modes:
//! - **immediate**: every `log()` call posts its entry right away and resolves
//!   with the outcome of that request
//! - **batch**: entries are queued and posted together, once per throttle
//!   window or as soon as the queue reaches the batch size
//!
//! Every outcome is also broadcast as a [`DispatchEvent`] (`logged` per
//! entry, `error` per failed request). [`IngestLayer`] plugs a dispatcher
//! into `tracing`.
//!
//! # Example
//!
//! ```no_run
//! use relic_transport::{Dispatcher, TransportOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = TransportOptions::new("https://log-api.newrelic.com", "license-key")
//!         .with_batch_size(50)
//!         .with_batch_throttle(true);
//!     let dispatcher = Dispatcher::new(options)?;
//!
//!     dispatcher.log(json!({ "message": "hello", "level": "info" })).await?;
//!     dispatcher.flush().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod layer;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use config::{BatchConfig, BatchSetting, DispatchMode, TransportOptions};
pub use error::{ConfigError, DispatchError};
pub use event::DispatchEvent;
pub use layer::IngestLayer;
pub use repository::{HttpLogRepository, LogRepository};
pub use service::{Completion, Dispatcher};

pub use relic_core::domain::log::{LogEntry, LogLevel};
pub use relic_core::dto::log::LogPayload;
