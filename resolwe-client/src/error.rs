//! Error types for the Resolwe client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Resolwe client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Login was rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Process did not reach a terminal status in time
    ///
    /// The process may still be running on the server.
    #[error("Process '{slug}' did not finish within {timeout:?}")]
    PollTimeout {
        /// Slug of the process being waited on
        slug: String,
        /// The polling budget that was exceeded
        timeout: Duration,
    },

    /// Process finished with an error status
    #[error("Process '{slug}' (data {id}) failed: {message}")]
    ProcessFailed {
        slug: String,
        id: u64,
        message: String,
    },

    /// Operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Worker task panicked or was aborted
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Local file system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this error came from talking to the server
    ///
    /// Covers transport failures, error responses and unreadable payloads.
    pub fn is_communication_error(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::ApiError { .. } | Self::ParseError(_)
        )
    }

    /// Check if this error is a local polling timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
