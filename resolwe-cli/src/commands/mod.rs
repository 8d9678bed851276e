//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod data;
mod run;
mod schema;

pub use data::DataCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;
use crate::types::InputArg;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a process and wait for it to finish
    Run {
        /// Process slug (e.g. "counts")
        slug: String,

        /// Inputs as name=value pairs; values are parsed as JSON when possible
        #[arg(short, long = "input")]
        inputs: Vec<InputArg>,
    },
    /// Data object inspection
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Show a descriptor schema
    Schema {
        /// Descriptor schema slug
        slug: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run { slug, inputs } => run::handle_run_command(config, &slug, inputs).await,
        Commands::Data { command } => data::handle_data_command(command, config).await,
        Commands::Schema { slug } => schema::show_schema(config, &slug).await,
    }
}
