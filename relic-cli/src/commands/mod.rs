//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod pipe;
mod send;
mod summary;

use anyhow::Result;
use clap::Subcommand;
use relic_core::domain::log::LogLevel;

use crate::config::{Config, parse_key_value};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send a single log entry
    Send {
        /// Log message
        message: String,

        /// Log level
        #[arg(short, long, default_value = "info")]
        level: LogLevel,

        /// Extra field, repeatable; values that parse as JSON keep their type
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },
    /// Ship stdin line by line
    ///
    /// JSON lines are sent as they are, other lines become entries with the
    /// given level.
    Pipe {
        /// Level of plain-text lines
        #[arg(short, long, default_value = "info")]
        level: LogLevel,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Send {
            message,
            level,
            fields,
        } => send::handle_send(message, level, fields, config).await,
        Commands::Pipe { level } => pipe::handle_pipe(level, config).await,
    }
}
