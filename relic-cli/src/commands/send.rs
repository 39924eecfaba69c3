//! Send command handler
//!
//! Builds one entry from the command line and ships it.

use anyhow::Result;
use colored::*;
use relic_core::domain::log::{LogEntry, LogLevel};
use serde_json::Value;

use crate::config::Config;

/// Send one entry and report the outcome
pub async fn handle_send(
    message: String,
    level: LogLevel,
    fields: Vec<(String, String)>,
    config: &Config,
) -> Result<()> {
    let dispatcher = config.dispatcher()?;
    let entry = build_entry(message, level, fields);

    dispatcher.log(entry).await?;
    // Batch mode only queued it
    dispatcher.flush().await?;

    println!("{} {}", "✓".green(), "Log entry sent".bold());
    Ok(())
}

fn build_entry(message: String, level: LogLevel, fields: Vec<(String, String)>) -> LogEntry {
    fields
        .into_iter()
        .fold(LogEntry::new(level, message), |entry, (key, value)| {
            entry.with_field(key, field_value(value))
        })
}

/// `42`, `true` or `{"a":1}` keep their JSON type, anything else is a string
fn field_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
