//! Configuration module
//!
//! Handles CLI configuration: server location, credentials and the polling
//! budget, turned into a client configuration on demand.

use anyhow::{Context, Result};
use resolwe_client::{ClientConfig, ResolweClient};
use std::time::Duration;
use tracing::debug;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Resolwe server
    pub url: String,
    pub username: String,
    pub password: String,
    /// Seconds to wait for a process to finish
    pub poll_timeout: u64,
}

impl Config {
    /// Builds the client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url, &self.username, &self.password)
            .with_poll_timeout(Duration::from_secs(self.poll_timeout))
    }

    /// Connects (and logs in) to the server
    pub async fn connect(&self) -> Result<ResolweClient> {
        debug!("Connecting to {}", self.url);
        ResolweClient::connect(self.client_config())
            .await
            .with_context(|| format!("Failed to connect to {}", self.url))
    }
}
