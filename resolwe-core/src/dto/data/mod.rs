//! Data DTOs for process submission and annotation

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::data::ProcessInputs;

/// Request to run a process
///
/// Posted to `data/get_or_create` (reuses a matching object) or to `data`
/// (always starts a new one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateData {
    /// Slug of the process to run
    pub process: String,
    pub input: ProcessInputs,
}

/// Partial update of a data object's annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDescriptor {
    /// Slug of the descriptor schema the descriptor follows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_schema: Option<String>,
    pub descriptor: JsonValue,
}
