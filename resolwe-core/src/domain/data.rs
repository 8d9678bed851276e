//! Data object domain types
//!
//! A `Data` object is the server's record of one process invocation: the
//! inputs it was started with, its processing status and, once finished, its
//! outputs. Clients hold a local copy and refresh it by polling.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Inputs submitted with a process, keyed by parameter name
pub type ProcessInputs = HashMap<String, JsonValue>;

/// Data object as returned by the Resolwe API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    /// Slug of the process that produced this object
    #[serde(default)]
    pub process_slug: String,
    pub status: DataStatus,
    #[serde(default)]
    pub input: ProcessInputs,
    #[serde(default)]
    pub output: HashMap<String, JsonValue>,
    #[serde(default)]
    pub descriptor: JsonValue,
    #[serde(default)]
    pub descriptor_schema: Option<JsonValue>,
    #[serde(default)]
    pub started: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub finished: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub process_error: Vec<String>,
    #[serde(default)]
    pub current_user_permissions: Vec<Permission>,
}

/// Processing status of a data object
///
/// The server reports fine-grained two-letter codes; the client only cares
/// whether the object is still waiting, being processed, or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataStatus {
    /// Uploading, resolving, waiting or preparing
    #[serde(rename = "WT", alias = "UP", alias = "RE", alias = "PP")]
    Pending,
    #[serde(rename = "PR")]
    Running,
    #[serde(rename = "OK")]
    Ok,
    /// Failed, or dirty (an input failed)
    #[serde(rename = "ER", alias = "DR")]
    Error,
}

/// Permissions the current user holds on an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl DataStatus {
    /// No further transitions happen once a status is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, DataStatus::Ok | DataStatus::Error)
    }
}

impl std::fmt::Display for DataStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataStatus::Pending => "pending",
            DataStatus::Running => "running",
            DataStatus::Ok => "ok",
            DataStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl Data {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_ok(&self) -> bool {
        self.status == DataStatus::Ok
    }

    pub fn is_error(&self) -> bool {
        self.status == DataStatus::Error
    }

    /// Encodes this object as an input of another process
    ///
    /// The server resolves data inputs by id.
    pub fn as_input(&self) -> JsonValue {
        JsonValue::from(self.id)
    }

    /// Returns the storage id referenced by an output field, if any
    pub fn storage_id(&self, output_field: &str) -> Option<u64> {
        self.output.get(output_field).and_then(JsonValue::as_u64)
    }

    /// Returns the file name stored in a file-typed output field
    ///
    /// File outputs are objects of the form `{"file": "...", "size": ...}`.
    pub fn output_file(&self, output_field: &str) -> Option<&str> {
        self.output
            .get(output_field)
            .and_then(|v| v.get("file"))
            .and_then(JsonValue::as_str)
    }

    /// Joins the process error messages into a single line
    pub fn error_message(&self) -> Option<String> {
        if self.process_error.is_empty() {
            None
        } else {
            Some(self.process_error.join("; "))
        }
    }
}
