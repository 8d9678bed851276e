//! File upload DTOs

use serde::{Deserialize, Serialize};

/// Response of the file upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

/// A file stored in the server's upload area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub name: String,
    /// Temporary name to reference the file from process inputs
    pub temp: String,
    #[serde(default)]
    pub size: Option<u64>,
}
