//! Transport configuration
//!
//! Defines the settings of a dispatcher: where logs go, which credentials
//! travel with them, and whether entries are sent one by one or batched.
//!
//! Every dispatcher owns its own [`TransportOptions`] value; options are never
//! shared between instances.

use relic_client::{DEFAULT_TIMEOUT, LICENSE_KEY_HEADER, TransportConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Entries per batch when batching is enabled without an explicit size
pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Throttle window (ms) when batching is enabled without an explicit window
pub const DEFAULT_BATCH_THROTTLE_MS: i64 = 1000;

/// Buffered events per subscriber before the slowest one starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// A batching knob: either "use the default" or an explicit number
///
/// Deserializes from `true`, `false` or an integer. `false` counts as not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BatchSetting {
    Flag(bool),
    Value(i64),
}

impl BatchSetting {
    fn is_set(&self) -> bool {
        !matches!(self, BatchSetting::Flag(false))
    }

    fn resolve(&self, default: i64) -> i64 {
        match self {
            BatchSetting::Flag(_) => default,
            BatchSetting::Value(value) => *value,
        }
    }
}

impl From<bool> for BatchSetting {
    fn from(flag: bool) -> Self {
        BatchSetting::Flag(flag)
    }
}

impl From<i64> for BatchSetting {
    fn from(value: i64) -> Self {
        BatchSetting::Value(value)
    }
}

impl From<i32> for BatchSetting {
    fn from(value: i32) -> Self {
        BatchSetting::Value(value.into())
    }
}

impl FromStr for BatchSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "true" => Ok(BatchSetting::Flag(true)),
            "false" => Ok(BatchSetting::Flag(false)),
            other => other
                .parse::<i64>()
                .map(BatchSetting::Value)
                .map_err(|_| format!("expected true, false or an integer, got '{}'", other)),
        }
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, Deserialize)]
pub struct TransportOptions {
    /// Credential sent with every request
    pub license_key: String,

    /// Base URL of the ingestion API (e.g., "https://log-api.newrelic.com")
    pub api_url: String,

    /// Request timeout in milliseconds (default: 5000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Extra request headers, merged under the mandatory ones
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Name of the credential header (default: X-License-Key)
    #[serde(default)]
    pub credential_header: Option<String>,

    /// Entries per batch; setting this or `batch_throttle` enables batching
    #[serde(default)]
    pub batch_size: Option<BatchSetting>,

    /// Throttle window in milliseconds
    #[serde(default)]
    pub batch_throttle: Option<BatchSetting>,

    /// Capacity of the event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl TransportOptions {
    /// Creates options for immediate (unbatched) sending
    pub fn new(api_url: impl Into<String>, license_key: impl Into<String>) -> Self {
        Self {
            license_key: license_key.into(),
            api_url: api_url.into(),
            timeout_ms: None,
            headers: BTreeMap::new(),
            credential_header: None,
            batch_size: None,
            batch_throttle: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Creates options from environment variables
    ///
    /// Expected environment variables:
    /// - RELIC_LICENSE_KEY (required)
    /// - RELIC_API_URL (required)
    /// - RELIC_TIMEOUT_MS (optional, default: 5000)
    /// - RELIC_BATCH_SIZE (optional, `true` or a number)
    /// - RELIC_BATCH_THROTTLE_MS (optional, `true` or a number)
    /// - RELIC_CREDENTIAL_HEADER (optional, default: X-License-Key)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates options from any key/value source using the variable names of
    /// [`TransportOptions::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let license_key =
            lookup("RELIC_LICENSE_KEY").ok_or(ConfigError::Missing("RELIC_LICENSE_KEY"))?;
        let api_url = lookup("RELIC_API_URL").ok_or(ConfigError::Missing("RELIC_API_URL"))?;

        let mut options = Self::new(api_url, license_key);

        options.timeout_ms = lookup("RELIC_TIMEOUT_MS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid(format!("RELIC_TIMEOUT_MS: '{}'", raw)))
            })
            .transpose()?;

        options.batch_size = lookup("RELIC_BATCH_SIZE")
            .map(|raw| parse_setting("RELIC_BATCH_SIZE", &raw))
            .transpose()?;

        options.batch_throttle = lookup("RELIC_BATCH_THROTTLE_MS")
            .map(|raw| parse_setting("RELIC_BATCH_THROTTLE_MS", &raw))
            .transpose()?;

        options.credential_header = lookup("RELIC_CREDENTIAL_HEADER");

        Ok(options)
    }

    pub fn with_batch_size(mut self, batch_size: impl Into<BatchSetting>) -> Self {
        self.batch_size = Some(batch_size.into());
        self
    }

    /// Sets the throttle window, in milliseconds
    pub fn with_batch_throttle(mut self, batch_throttle: impl Into<BatchSetting>) -> Self {
        self.batch_throttle = Some(batch_throttle.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_credential_header(mut self, name: impl Into<String>) -> Self {
        self.credential_header = Some(name.into());
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validates the connection settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.license_key.is_empty() {
            return Err(ConfigError::Missing("license_key"));
        }

        if self.api_url.is_empty() {
            return Err(ConfigError::Missing("api_url"));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "api_url must start with http:// or https://".to_string(),
            ));
        }

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Connection settings for the ingestion client
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.api_url.clone(), self.license_key.clone())
            .with_credential_header(
                self.credential_header
                    .clone()
                    .unwrap_or_else(|| LICENSE_KEY_HEADER.to_string()),
            )
            .with_headers(self.headers.clone())
            .with_timeout(
                self.timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_TIMEOUT),
            )
    }
}

fn parse_setting(key: &str, raw: &str) -> Result<BatchSetting, ConfigError> {
    raw.parse()
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", key, e)))
}

/// Resolved batching parameters
///
/// Both values are strictly positive; this is checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    batch_size: usize,
    batch_throttle: Duration,
}

impl BatchConfig {
    pub fn new(batch_size: usize, batch_throttle: Duration) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        if batch_throttle.is_zero() {
            return Err(ConfigError::BatchThrottle);
        }
        Ok(Self {
            batch_size,
            batch_throttle,
        })
    }

    /// Queue length that forces an immediate flush
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Length of the throttle window
    pub fn batch_throttle(&self) -> Duration {
        self.batch_throttle
    }
}

/// How a dispatcher sends entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Each entry is sent on its own and acknowledged once the send settles
    Immediate,
    /// Entries are queued and sent in throttled batches
    Batch(BatchConfig),
}

impl DispatchMode {
    /// Selects the mode from the batching settings
    ///
    /// Batching is enabled as soon as either knob is set; the other one then
    /// falls back to its default.
    pub fn resolve(options: &TransportOptions) -> Result<Self, ConfigError> {
        let batch_size = options.batch_size.filter(BatchSetting::is_set);
        let batch_throttle = options.batch_throttle.filter(BatchSetting::is_set);

        if batch_size.is_none() && batch_throttle.is_none() {
            return Ok(DispatchMode::Immediate);
        }

        let size = batch_size.map_or(DEFAULT_BATCH_SIZE, |s| s.resolve(DEFAULT_BATCH_SIZE));
        let throttle_ms = batch_throttle.map_or(DEFAULT_BATCH_THROTTLE_MS, |s| {
            s.resolve(DEFAULT_BATCH_THROTTLE_MS)
        });

        let size = usize::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::BatchSize)?;
        let throttle_ms = u64::try_from(throttle_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::BatchThrottle)?;

        BatchConfig::new(size, Duration::from_millis(throttle_ms)).map(DispatchMode::Batch)
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, DispatchMode::Batch(_))
    }
}
