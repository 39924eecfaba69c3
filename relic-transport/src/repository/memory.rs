//! Recording repository used by the dispatcher tests

use async_trait::async_trait;
use relic_client::ClientError;
use relic_core::dto::log::LogPayload;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::LogRepository;

/// Records every payload it is asked to send
///
/// Can be told to fail with a status code, or to hold each send until a
/// permit is added to its gate.
#[derive(Default)]
pub struct RecordingRepository {
    sent: Mutex<Vec<LogPayload>>,
    failure: Mutex<Option<u16>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(status: u16) -> Arc<Self> {
        let repository = Self::default();
        *repository.failure.lock().unwrap() = Some(status);
        Arc::new(repository)
    }

    /// A repository whose sends wait for a permit on the returned gate
    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let repository = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (Arc::new(repository), gate)
    }

    pub fn sent(&self) -> Vec<LogPayload> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages of every sent payload, one vector per request
    pub fn sent_messages(&self) -> Vec<Vec<String>> {
        self.sent()
            .iter()
            .map(|payload| {
                payload
                    .entries()
                    .iter()
                    .map(|entry| entry.message().unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl LogRepository for RecordingRepository {
    async fn send_logs(&self, payload: &LogPayload) -> relic_client::Result<()> {
        self.sent.lock().unwrap().push(payload.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        match *self.failure.lock().unwrap() {
            Some(status) => Err(ClientError::api_error(status, "rejected")),
            None => Ok(()),
        }
    }
}
