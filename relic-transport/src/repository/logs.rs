//! Logs repository
//!
//! Handles posting log payloads to the ingestion API.
//! This is a stateless HTTP client - queueing and batching live in the service layer.

use async_trait::async_trait;
use relic_client::IngestClient;
use relic_core::dto::log::LogPayload;

/// Repository trait for sending logs to the ingestion API
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Sends one payload
    ///
    /// # Arguments
    /// * `payload` - A single entry or an ordered batch
    ///
    /// Resolves on a 2xx response and fails otherwise. Never retries.
    async fn send_logs(&self, payload: &LogPayload) -> relic_client::Result<()>;
}

/// HTTP implementation of LogRepository
pub struct HttpLogRepository {
    client: IngestClient,
}

impl HttpLogRepository {
    /// Creates a new HTTP log repository
    ///
    /// # Arguments
    /// * `client` - A configured ingestion client
    pub fn new(client: IngestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &IngestClient {
        &self.client
    }
}

#[async_trait]
impl LogRepository for HttpLogRepository {
    async fn send_logs(&self, payload: &LogPayload) -> relic_client::Result<()> {
        if payload.is_empty() {
            return Ok(());
        }

        self.client.send_logs(payload).await
    }
}
