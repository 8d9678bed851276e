//! Resolwe HTTP Client
//!
//! A type-safe client for running processes on a Resolwe server and waiting
//! for their results.
//!
//! The crate is organized in three layers:
//! - [`ResolweClient`]: thin wrapper over the REST API (data objects, storage,
//!   descriptor schemas, file downloads)
//! - [`ProcessRunner`]: submits a process through any [`JobRunner`] and polls
//!   it until it reaches a terminal status
//! - [`TaskSlot`]: runs one long operation at a time off the caller's task,
//!   with synchronous cancellation and exactly-once result delivery
//!
//! # Example
//!
//! ```no_run
//! use resolwe_client::{ClientConfig, ProcessRunner, ResolweClient};
//! use serde_json::json;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::default();
//!     let client = Arc::new(ResolweClient::connect(config.clone()).await?);
//!     let runner = ProcessRunner::new(client, &config);
//!
//!     let inputs = HashMap::from([
//!         ("data_table".to_string(), json!(12)),
//!         ("axis".to_string(), json!(1)),
//!     ]);
//!     let data = runner.run_process("counts", inputs).await?;
//!
//!     println!("data {} finished with status {}", data.id, data.status);
//!     Ok(())
//! }
//! ```

pub mod config;
mod data;
pub mod error;
pub mod process;
pub mod runner;
mod schemas;
pub mod task;
#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use process::ProcessRunner;
pub use resolwe_core::domain::data::{Data, DataStatus, ProcessInputs};
pub use runner::JobRunner;
pub use task::{Task, TaskCompletion, TaskSlot};
pub use tokio_util::sync::CancellationToken;

use reqwest::{Client, RequestBuilder};
use resolwe_core::dto::auth::LoginRequest;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// HTTP client for the Resolwe REST API
///
/// Authentication uses a session cookie obtained from the login endpoint.
/// Unsafe requests additionally carry the CSRF token issued at login.
#[derive(Debug, Clone)]
pub struct ResolweClient {
    /// Base URL of the server, without trailing slash
    base_url: String,
    /// HTTP client instance (keeps the session cookie)
    client: Client,
    /// CSRF token issued at login
    csrf_token: Option<String>,
}

impl ResolweClient {
    /// Create a client without logging in
    ///
    /// Useful for servers that allow anonymous read access.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(config.url.clone(), client))
    }

    /// Create a client and log in with the configured credentials
    ///
    /// # Example
    /// ```no_run
    /// # use resolwe_client::{ClientConfig, ResolweClient};
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = ClientConfig::new("http://127.0.0.1:8000", "admin", "admin123");
    /// let client = ResolweClient::connect(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let mut client = Self::new(&config)?;

        if config.has_credentials() {
            client.login(&config.username, &config.password).await?;
        }

        Ok(client)
    }

    /// Create a client with a custom HTTP client
    ///
    /// The HTTP client must have its cookie store enabled for session
    /// authentication to work.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            csrf_token: None,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a login has completed on this client
    pub fn is_authenticated(&self) -> bool {
        self.csrf_token.is_some()
    }

    /// Log in and keep the session for subsequent requests
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/rest-auth/login/", self.base_url);
        debug!("Logging in to {} as {}", self.base_url, username);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::AuthenticationFailed(format!(
                "status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let token = response
            .cookies()
            .find(|cookie| cookie.name() == "csrftoken")
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| {
                ClientError::AuthenticationFailed("server did not issue a CSRF token".to_string())
            })?;

        self.csrf_token = Some(token);
        info!("Logged in to {}", self.base_url);
        Ok(())
    }

    /// Build a POST request carrying the CSRF headers
    fn post(&self, url: &str) -> RequestBuilder {
        self.with_csrf(self.client.post(url))
    }

    /// Build a PATCH request carrying the CSRF headers
    fn patch(&self, url: &str) -> RequestBuilder {
        self.with_csrf(self.client.patch(url))
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.csrf_token {
            Some(token) => request
                .header("X-CSRFToken", token)
                .header(reqwest::header::REFERER, &self.base_url),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response with a raw body (file downloads)
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
