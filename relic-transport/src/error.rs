//! Error types for the dispatcher

use relic_client::ClientError;
use std::sync::Arc;
use thiserror::Error;

/// Invalid configuration, raised while constructing a dispatcher
///
/// No dispatcher is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("batchSize must be greater than 0")]
    BatchSize,

    #[error("batchThrottle must be greater than 0")]
    BatchThrottle,

    /// A required setting was not provided
    #[error("{0} is required")]
    Missing(&'static str),

    /// A setting was provided but could not be used
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The ingestion client could not be built from the settings
    #[error("failed to build ingestion client: {0}")]
    Client(#[from] ClientError),
}

/// Failure of a log submission or of a flush
///
/// Cloneable so the same value can be returned to the caller and broadcast
/// as an `error` event.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The HTTP call to the ingestion API failed
    #[error(transparent)]
    Transport(Arc<ClientError>),

    /// Something went wrong while queueing or draining entries
    #[error("log submission failed: {0}")]
    Submission(String),
}

impl DispatchError {
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    /// The underlying client error, if this is a transport failure
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            DispatchError::Transport(err) => Some(err.as_ref()),
            DispatchError::Submission(_) => None,
        }
    }
}

impl From<ClientError> for DispatchError {
    fn from(err: ClientError) -> Self {
        Self::Transport(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_messages() {
        assert_eq!(
            ConfigError::BatchSize.to_string(),
            "batchSize must be greater than 0"
        );
        assert_eq!(
            ConfigError::BatchThrottle.to_string(),
            "batchThrottle must be greater than 0"
        );
        assert_eq!(
            ConfigError::Missing("licenseKey").to_string(),
            "licenseKey is required"
        );
    }

    #[test]
    fn test_transport_error_is_shared() {
        let err = DispatchError::from(ClientError::api_error(500, "boom"));
        let copy = err.clone();

        match (&err, &copy) {
            (DispatchError::Transport(a), DispatchError::Transport(b)) => {
                assert!(Arc::ptr_eq(a, b))
            }
            _ => panic!("expected transport errors"),
        }
        assert_eq!(err.to_string(), "API error (status 500): boom");
        assert!(err.client_error().is_some_and(ClientError::is_server_error));
    }
}
