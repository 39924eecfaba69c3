//! Configuration module
//!
//! Turns the CLI arguments into transport options.

use anyhow::{Context, Result};
use relic_transport::{BatchSetting, Dispatcher, TransportOptions};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ingestion API
    pub api_url: String,
    pub license_key: String,
    pub batch_size: Option<BatchSetting>,
    pub batch_throttle_ms: Option<BatchSetting>,
    pub timeout_ms: Option<u64>,
    pub credential_header: Option<String>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl Config {
    /// Options for a dispatcher built from this configuration
    pub fn transport_options(&self) -> TransportOptions {
        let mut options = TransportOptions::new(&self.api_url, &self.license_key);
        options.batch_size = self.batch_size;
        options.batch_throttle = self.batch_throttle_ms;
        options.timeout_ms = self.timeout_ms;
        options.credential_header = self.credential_header.clone();
        options.headers = self.headers.iter().cloned().collect();
        options
    }

    pub fn dispatcher(&self) -> Result<Dispatcher> {
        Dispatcher::new(self.transport_options()).context("Invalid transport configuration")
    }
}

/// Parses a `KEY=VALUE` argument
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }

    Ok((key.to_string(), value.to_string()))
}
