//! Log ingestion endpoint

use crate::IngestClient;
use crate::error::Result;
use relic_core::dto::log::LogPayload;
use tracing::debug;

/// Path of the log ingestion endpoint, relative to the base URL
pub const LOG_API_PATH: &str = "/log/v1";

impl IngestClient {
    /// Post a log payload to the ingestion API
    ///
    /// Resolves on any 2xx. Connection failures, timeouts and non-2xx
    /// responses all come back as an error; nothing is retried.
    ///
    /// # Arguments
    /// * `payload` - A single entry or a batch of entries
    pub async fn send_logs(&self, payload: &LogPayload) -> Result<()> {
        let url = format!("{}{}", self.base_url, LOG_API_PATH);
        debug!("Posting {} log entries to {}", payload.len(), url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
