//! Error types for the ingestion client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when posting logs
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body encoding)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned a non-2xx status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body returned by the API
        message: String,
    },

    /// A configured header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the request gave up because the timeout elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_timeout())
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ClientError::api_error(403, "forbidden").is_client_error());
        assert!(!ClientError::api_error(403, "forbidden").is_server_error());
        assert!(ClientError::api_error(503, "unavailable").is_server_error());
        assert!(!ClientError::InvalidHeader("x".into()).is_timeout());
    }

    #[test]
    fn test_display() {
        let err = ClientError::api_error(400, "bad payload");
        assert_eq!(err.to_string(), "API error (status 400): bad payload");
    }
}
