//! Data command handlers
//!
//! Handles listing and viewing data objects, reading their JSON outputs,
//! downloading output files and uploading tables.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use resolwe_client::ProcessRunner;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::display::{print_data_details, print_data_summary, print_data_table};

/// Data subcommands
#[derive(Subcommand)]
pub enum DataCommands {
    /// List data objects
    List {
        /// Type prefix to filter on
        #[arg(short = 't', long = "type", default_value = "data:table")]
        data_type: String,

        /// Render descriptor columns using this descriptor schema
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Get data object details
    Get {
        /// Data object ID
        id: u64,
    },
    /// Print a JSON output stored in server storage
    Json {
        /// Data object ID
        id: u64,

        /// Output field referencing the storage (e.g. "counts_json")
        field: String,

        /// Extract a single top-level key from the stored JSON
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Download an output file
    Download {
        /// Data object ID
        id: u64,

        /// File output field
        #[arg(short, long, default_value = "table")]
        field: String,

        /// Destination directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Upload a table file as a new data object
    Upload {
        /// Table file to upload (e.g. "aml-1k.pickle")
        file: PathBuf,

        /// Descriptor schema the descriptor follows
        #[arg(short, long, requires = "descriptor")]
        schema: Option<String>,

        /// Descriptor as JSON, e.g. '{"tabular": {"title": "AML 1k"}}'
        #[arg(short, long, value_parser = parse_descriptor)]
        descriptor: Option<JsonValue>,
    },
}

fn parse_descriptor(input: &str) -> Result<JsonValue, String> {
    match serde_json::from_str(input) {
        Ok(value @ JsonValue::Object(_)) => Ok(value),
        Ok(_) => Err("descriptor must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid descriptor JSON: {}", e)),
    }
}

/// Handle data commands
pub async fn handle_data_command(command: DataCommands, config: &Config) -> Result<()> {
    match command {
        DataCommands::List { data_type, schema } => {
            list_data(config, &data_type, schema.as_deref()).await
        }
        DataCommands::Get { id } => get_data(config, id).await,
        DataCommands::Json { id, field, key } => {
            print_json(config, id, &field, key.as_deref()).await
        }
        DataCommands::Download { id, field, dir } => {
            download_output(config, id, &field, dir).await
        }
        DataCommands::Upload {
            file,
            schema,
            descriptor,
        } => upload_table(config, &file, schema.as_deref(), descriptor).await,
    }
}

/// List data objects of a type
async fn list_data(config: &Config, data_type: &str, schema: Option<&str>) -> Result<()> {
    let client = config.connect().await?;
    let objects = client
        .list_data(Some(data_type))
        .await
        .context("Failed to list data objects")?;

    if objects.is_empty() {
        println!("{}", format!("No {} objects found.", data_type).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Data objects on server: {}", objects.len()).bold()
    );
    println!();

    match schema {
        Some(slug) => {
            let schema = client
                .get_descriptor_schema(slug)
                .await
                .with_context(|| format!("Failed to fetch descriptor schema '{}'", slug))?;
            print_data_table(&objects, &schema);
        }
        None => {
            for data in &objects {
                print_data_summary(data);
            }
        }
    }

    Ok(())
}

/// Get and display a single data object
async fn get_data(config: &Config, id: u64) -> Result<()> {
    let client = config.connect().await?;
    let data = client
        .get_data(id)
        .await
        .with_context(|| format!("Failed to fetch data {}", id))?;

    print_data_details(&data);
    Ok(())
}

/// Print a stored JSON output
async fn print_json(config: &Config, id: u64, field: &str, key: Option<&str>) -> Result<()> {
    let client = Arc::new(config.connect().await?);
    let data = client
        .get_data(id)
        .await
        .with_context(|| format!("Failed to fetch data {}", id))?;

    let runner = ProcessRunner::new(client, &config.client_config());
    let value = runner
        .get_json(&data, field, key)
        .await
        .with_context(|| format!("Failed to read output '{}' of data {}", field, id))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Download an output file into a directory
async fn download_output(config: &Config, id: u64, field: &str, dir: PathBuf) -> Result<()> {
    let client = config.connect().await?;
    let data = client
        .get_data(id)
        .await
        .with_context(|| format!("Failed to fetch data {}", id))?;

    if !data.is_ok() {
        anyhow::bail!("data {} is not finished (status: {})", id, data.status);
    }

    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = client
        .download_output(&data, field, &dir)
        .await
        .with_context(|| format!("Failed to download output '{}' of data {}", field, id))?;

    println!("{} {}", "✓ Downloaded".green(), path.display());
    Ok(())
}

/// Upload a table file and report the new data object
async fn upload_table(
    config: &Config,
    file: &Path,
    schema: Option<&str>,
    descriptor: Option<JsonValue>,
) -> Result<()> {
    let client = config.connect().await?;
    let data = client
        .upload_data_table(file, schema, descriptor)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    println!("{} {}", "✓ Uploaded".green(), file.display());
    println!();
    print_data_summary(&data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_descriptor() {
        let value = parse_descriptor(r#"{"tabular": {"title": "AML 1k"}}"#).unwrap();
        assert_eq!(value, json!({"tabular": {"title": "AML 1k"}}));

        assert!(parse_descriptor("[1, 2]").is_err());
        assert!(parse_descriptor("{not json").is_err());
    }
}
