//! Resolwe CLI
//!
//! Command-line interface for running processes and inspecting data objects
//! on a Resolwe server.

mod commands;
mod config;
mod display;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use resolwe_client::config::{DEFAULT_PASSWORD, DEFAULT_URL, DEFAULT_USERNAME};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "resolwe")]
#[command(about = "Run and inspect processes on a Resolwe server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "RESOLWE_HOST_URL", default_value = DEFAULT_URL)]
    url: String,

    /// API username (empty for anonymous access)
    #[arg(long, env = "RESOLWE_API_USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    /// API password
    #[arg(
        long,
        env = "RESOLWE_API_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_env_values = true
    )]
    password: String,

    /// Seconds to wait for a process before giving up
    #[arg(long, default_value = "60")]
    poll_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resolwe=info,resolwe_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        url: cli.url,
        username: cli.username,
        password: cli.password,
        poll_timeout: cli.poll_timeout,
    };

    handle_command(cli.command, &config).await
}
