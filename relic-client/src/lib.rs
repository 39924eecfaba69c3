//! Relic HTTP Client
//!
//! A small, type-safe HTTP client for the log ingestion API.
//!
//! The client owns everything the wire needs to know: the base URL, the
//! merged request headers (caller headers plus the mandatory credential and
//! content-type headers) and the request timeout. It performs no retries and
//! never interprets a response beyond success or failure.
//!
//! # Example
//!
//! ```no_run
//! use relic_client::{IngestClient, TransportConfig};
//! use relic_core::domain::log::{LogEntry, LogLevel};
//! use relic_core::dto::log::LogPayload;
//!
//! #[tokio::main]
//! async fn main() -> relic_client::Result<()> {
//!     let config = TransportConfig::new("https://log-api.newrelic.com", "license-key");
//!     let client = IngestClient::new(config)?;
//!
//!     let entry = LogEntry::new(LogLevel::Info, "service started");
//!     client.send_logs(&LogPayload::Single(entry)).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod logs;

pub use error::{ClientError, Result};
pub use logs::LOG_API_PATH;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default header carrying the license key
pub const LICENSE_KEY_HEADER: &str = "X-License-Key";

/// Connection settings for the ingestion API
///
/// Immutable once handed to [`IngestClient::new`].
#[derive(Clone)]
pub struct TransportConfig {
    base_url: String,
    license_key: String,
    credential_header: String,
    headers: BTreeMap<String, String>,
    timeout: Duration,
}

impl TransportConfig {
    /// Creates a configuration with the default credential header and timeout
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the ingestion API (e.g., "https://log-api.newrelic.com")
    /// * `license_key` - Credential sent with every request
    pub fn new(base_url: impl Into<String>, license_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            license_key: license_key.into(),
            credential_header: LICENSE_KEY_HEADER.to_string(),
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the name of the header carrying the license key
    pub fn with_credential_header(mut self, name: impl Into<String>) -> Self {
        self.credential_header = name.into();
        self
    }

    /// Adds a caller header; mandatory headers win on conflict
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds several caller headers at once
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the request headers
    ///
    /// Caller headers are applied first, then the credential and content-type
    /// headers overwrite any caller value with the same (case-insensitive) name.
    fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();

        for (name, value) in &self.headers {
            map.insert(parse_name(name)?, parse_value(name, value)?);
        }

        let mut credential = parse_value(&self.credential_header, &self.license_key)?;
        credential.set_sensitive(true);
        map.insert(parse_name(&self.credential_header)?, credential);
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(map)
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url)
            .field("credential_header", &self.credential_header)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn parse_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::InvalidHeader(format!("value of {}: {}", name, e)))
}

/// HTTP client for the log ingestion API
#[derive(Debug, Clone)]
pub struct IngestClient {
    /// Base URL of the API, without trailing slash
    base_url: String,
    /// Merged headers sent with every request
    headers: HeaderMap,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client instance
    client: Client,
}

impl IngestClient {
    /// Create a new ingestion client
    ///
    /// Fails only when a configured header is not valid HTTP.
    pub fn new(config: TransportConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    /// Create a new ingestion client on top of a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc. Headers and
    /// the timeout from `config` are applied to each request.
    pub fn with_client(config: TransportConfig, client: Client) -> Result<Self> {
        let headers = config.header_map()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
            timeout: config.timeout,
            client,
        })
    }

    /// Get the base URL of the ingestion API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle an API response that carries no meaningful body
    ///
    /// Any 2xx is a success; everything else becomes [`ClientError::ApiError`].
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_defaults() {
        let client = IngestClient::new(TransportConfig::new("logs.foo.com", "000000")).unwrap();
        assert_eq!(client.base_url(), "logs.foo.com");
        assert_eq!(client.timeout(), Duration::from_millis(5000));
        assert_eq!(client.headers()["x-license-key"], "000000");
        assert_eq!(client.headers()["content-type"], "application/json");
        assert_eq!(client.headers().len(), 2);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            IngestClient::new(TransportConfig::new("http://localhost:8080/", "k")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_custom_timeout_and_headers() {
        let config = TransportConfig::new("logs.foo.com", "000000")
            .with_timeout(Duration::from_millis(123456))
            .with_header("X-Request-Source", "billing");
        let client = IngestClient::new(config).unwrap();

        assert_eq!(client.timeout(), Duration::from_millis(123456));
        assert_eq!(client.headers()["x-request-source"], "billing");
        assert_eq!(client.headers().len(), 3);
    }

    #[test]
    fn test_mandatory_headers_win() {
        let config = TransportConfig::new("logs.foo.com", "real-key").with_headers([
            ("x-license-key", "spoofed"),
            ("Content-Type", "text/plain"),
        ]);
        let client = IngestClient::new(config).unwrap();

        assert_eq!(client.headers()["x-license-key"], "real-key");
        assert_eq!(client.headers()["content-type"], "application/json");
        assert_eq!(client.headers().len(), 2);
    }

    #[test]
    fn test_alternate_credential_header() {
        let config =
            TransportConfig::new("logs.foo.com", "000000").with_credential_header("Api-Key");
        let client = IngestClient::new(config).unwrap();

        assert_eq!(client.headers()["api-key"], "000000");
        assert!(client.headers().get("x-license-key").is_none());
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let config = TransportConfig::new("logs.foo.com", "bad\nkey");
        let err = IngestClient::new(config).unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader(_)));

        let config = TransportConfig::new("logs.foo.com", "k").with_header("bad header", "v");
        assert!(IngestClient::new(config).is_err());
    }

    #[test]
    fn test_debug_hides_license_key() {
        let config = TransportConfig::new("logs.foo.com", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
