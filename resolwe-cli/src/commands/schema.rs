//! Descriptor schema command handler

use anyhow::{Context, Result};

use crate::config::Config;
use crate::display::print_schema;

/// Fetch and display a descriptor schema
pub async fn show_schema(config: &Config, slug: &str) -> Result<()> {
    let client = config.connect().await?;
    let schema = client
        .get_descriptor_schema(slug)
        .await
        .with_context(|| format!("Failed to fetch descriptor schema '{}'", slug))?;

    print_schema(&schema);
    Ok(())
}
