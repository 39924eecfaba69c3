//! Log domain types

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Key holding the entry timestamp
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Key wrapping payloads that are not JSON objects
pub const METADATA_KEY: &str = "metadata";

/// Key holding the entry severity
pub const LEVEL_KEY: &str = "level";

/// Key holding the human readable message
pub const MESSAGE_KEY: &str = "message";

/// A single structured log line
///
/// Entries are plain key/value records. Once an entry has been handed to the
/// transport it is only read and forwarded, never changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(Map<String, Value>);

impl LogEntry {
    /// Creates a timestamped entry with a level and a message
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(LEVEL_KEY.to_string(), Value::String(level.to_string()));
        fields.insert(MESSAGE_KEY.to_string(), Value::String(message.into()));
        Self::from_value(Value::Object(fields))
    }

    /// Normalizes a borrowed payload into a self-contained entry
    ///
    /// The payload is deep-cloned, so later changes made by the caller never
    /// reach an entry that is queued or already sent.
    pub fn normalize(payload: &Value) -> Self {
        Self::from_value(payload.clone())
    }

    /// Normalizes an owned payload into an entry
    ///
    /// - `null` becomes an empty record
    /// - any non-object value is wrapped as `{ "metadata": value }`
    /// - a missing timestamp is stamped with the current time (ISO-8601)
    pub fn from_value(payload: Value) -> Self {
        let mut fields = match payload {
            Value::Null => Map::new(),
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert(METADATA_KEY.to_string(), other);
                fields
            }
        };

        if fields.get(TIMESTAMP_KEY).is_none_or(Value::is_null) {
            fields.insert(TIMESTAMP_KEY.to_string(), Value::String(now_iso8601()));
        }

        Self(fields)
    }

    /// Adds a field, replacing any previous value under the same key
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn timestamp(&self) -> Option<&Value> {
        self.0.get(TIMESTAMP_KEY)
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get(MESSAGE_KEY).and_then(Value::as_str)
    }

    pub fn level(&self) -> Option<&str> {
        self.0.get(LEVEL_KEY).and_then(Value::as_str)
    }

    /// All fields of the entry
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Value> for LogEntry {
    fn from(payload: Value) -> Self {
        Self::from_value(payload)
    }
}

impl From<LogEntry> for Value {
    fn from(entry: LogEntry) -> Self {
        entry.into_value()
    }
}

impl From<Map<String, Value>> for LogEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_value(Value::Object(fields))
    }
}

/// Current time formatted the way ingestion APIs expect (`2024-01-01T00:00:00.000Z`)
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Severity of a log entry
///
/// Mirrors the npm-style levels most application loggers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Http,
    Verbose,
    Debug,
    Silly,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Http => "http",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Silly => "silly",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "http" => Ok(LogLevel::Http),
            "verbose" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "silly" | "trace" => Ok(LogLevel::Silly),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}
