//! Pipe command handler
//!
//! Ships stdin line by line until EOF, then flushes and prints a summary.

use anyhow::{Result, bail};
use relic_core::domain::log::{LogEntry, LogLevel};
use relic_transport::Dispatcher;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tracing::debug;

use super::summary::Summary;
use crate::config::Config;

/// Submissions allowed to be unresolved at once
///
/// Bounds concurrent requests in immediate mode; batch submissions resolve on
/// enqueue and release their slot right away.
const MAX_OUTSTANDING: usize = 16;

/// Read stdin and send every non-empty line
pub async fn handle_pipe(level: LogLevel, config: &Config) -> Result<()> {
    let dispatcher = config.dispatcher()?;
    let tracker = Summary::track(dispatcher.subscribe());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let outstanding = Arc::new(Semaphore::new(MAX_OUTSTANDING));
    let mut submitted = 0;

    while let Some(line) = lines.next_line().await? {
        let Some(payload) = parse_line(&line, level) else {
            continue;
        };

        submit(&dispatcher, payload, &outstanding).await?;
        submitted += 1;
    }

    debug!("Reached end of input after {} entries", submitted);

    // Failures were already reported through events
    let _ = dispatcher.flush().await;
    dispatcher.settled().await;
    drop(dispatcher);

    let summary = tracker.await?;
    summary.print(submitted);

    if !summary.is_success(submitted) {
        bail!("{} of {} log entries were not sent", submitted - summary.logged, submitted);
    }

    Ok(())
}

/// Submits one payload once a slot is free
async fn submit(
    dispatcher: &Dispatcher,
    payload: Value,
    outstanding: &Arc<Semaphore>,
) -> Result<()> {
    let slot = Arc::clone(outstanding).acquire_owned().await?;
    let completion = dispatcher.log(payload);
    tokio::spawn(async move {
        // Outcomes are collected from events
        let _ = completion.await;
        drop(slot);
    });
    Ok(())
}

/// Payload for one input line, `None` for blank lines
fn parse_line(line: &str, level: LogLevel) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(payload) => Some(payload),
        Err(_) => Some(LogEntry::new(level, line).into_value()),
    }
}
