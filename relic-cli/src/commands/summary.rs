//! Outcome tracking
//!
//! Listens to dispatcher events while a command runs and prints what happened.

use colored::*;
use relic_transport::DispatchEvent;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

/// What the dispatcher reported
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub logged: usize,
    pub failed_requests: usize,
}

impl Summary {
    /// Counts events until the dispatcher is gone
    ///
    /// The task ends once every dispatcher clone has been dropped and all of
    /// its sends finished.
    pub fn track(mut events: Receiver<DispatchEvent>) -> JoinHandle<Summary> {
        tokio::spawn(async move {
            let mut summary = Summary::default();
            loop {
                match events.recv().await {
                    Ok(event) => summary.record(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} dispatcher events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            summary
        })
    }

    fn record(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::Logged(_) => self.logged += 1,
            DispatchEvent::Error(err) => {
                self.failed_requests += 1;
                eprintln!("{} {}", "✗".red(), err);
            }
        }
    }

    /// Prints the outcome of `submitted` entries
    pub fn print(&self, submitted: usize) {
        let failed = submitted.saturating_sub(self.logged);

        if submitted == 0 {
            println!("{}", "No log entries to send.".yellow());
            return;
        }

        println!(
            "{} {}",
            "✓".green(),
            format!("{} logged", self.logged).bold()
        );
        if failed > 0 {
            println!(
                "{} {}",
                "✗".red(),
                format!(
                    "{} failed ({} failed request(s))",
                    failed, self.failed_requests
                )
                .bold()
            );
        }
    }

    pub fn is_success(&self, submitted: usize) -> bool {
        self.logged >= submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_transport::{DispatchError, LogEntry};

    #[test]
    fn test_record() {
        let mut summary = Summary::default();
        summary.record(&DispatchEvent::Logged(LogEntry::default()));
        summary.record(&DispatchEvent::Logged(LogEntry::default()));
        summary.record(&DispatchEvent::Error(DispatchError::submission("boom")));

        assert_eq!(summary.logged, 2);
        assert_eq!(summary.failed_requests, 1);
        assert!(!summary.is_success(3));
        assert!(summary.is_success(2));
    }

    #[tokio::test]
    async fn test_track_ends_when_sender_is_dropped() {
        let (tx, rx) = tokio::sync::broadcast::channel(8);
        let tracker = Summary::track(rx);

        tx.send(DispatchEvent::Logged(LogEntry::default())).unwrap();
        drop(tx);

        let summary = tracker.await.unwrap();
        assert_eq!(summary.logged, 1);
    }
}
