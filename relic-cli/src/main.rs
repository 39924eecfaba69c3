//! Relic CLI
//!
//! Command-line interface for shipping log entries to a log ingestion API.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, parse_key_value};
use relic_transport::BatchSetting;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "relic")]
#[command(about = "Ship structured logs to a log ingestion API", long_about = None)]
struct Cli {
    /// Ingestion API base URL
    #[arg(
        long,
        env = "RELIC_API_URL",
        default_value = "https://log-api.newrelic.com"
    )]
    api_url: String,

    /// License key sent with every request
    #[arg(long, env = "RELIC_LICENSE_KEY", hide_env_values = true)]
    license_key: String,

    /// Batch size (`true` for the default of 100); enables batching
    #[arg(long, env = "RELIC_BATCH_SIZE")]
    batch_size: Option<BatchSetting>,

    /// Throttle window in ms (`true` for the default of 1000); enables batching
    #[arg(long, env = "RELIC_BATCH_THROTTLE_MS")]
    batch_throttle_ms: Option<BatchSetting>,

    /// Request timeout in ms
    #[arg(long, env = "RELIC_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Name of the credential header
    #[arg(long, env = "RELIC_CREDENTIAL_HEADER")]
    credential_header: Option<String>,

    /// Extra request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    headers: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output, diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relic_cli=info,relic_transport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        license_key: cli.license_key,
        batch_size: cli.batch_size,
        batch_throttle_ms: cli.batch_throttle_ms,
        timeout_ms: cli.timeout_ms,
        credential_header: cli.credential_header,
        headers: cli.headers,
    };

    handle_command(cli.command, &config).await
}
