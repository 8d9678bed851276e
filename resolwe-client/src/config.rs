//! Client configuration
//!
//! Server connection settings and the polling budget used while waiting
//! for a process to finish. The configuration is passed explicitly to the
//! client; nothing is read from or written to the process environment here.

use std::time::Duration;

/// Default Resolwe server URL
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000/";

/// Default API username
pub const DEFAULT_USERNAME: &str = "admin";

/// Default API password
pub const DEFAULT_PASSWORD: &str = "admin123";

/// Time between two status checks of a running process
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Overall time budget for waiting on a process
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://127.0.0.1:8000/")
    pub url: String,

    /// API username, empty for anonymous access
    pub username: String,

    /// API password
    pub password: String,

    /// How often a running process is refreshed
    pub poll_interval: Duration,

    /// How long to wait for a process before giving up locally
    pub poll_timeout: Duration,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a new configuration with default polling settings
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Whether the client should log in before issuing requests
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("url cannot be empty");
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            anyhow::bail!("url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.poll_timeout <= self.poll_interval {
            anyhow::bail!("poll_timeout must be greater than poll_interval");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL, DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}
