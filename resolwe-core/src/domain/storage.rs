//! Storage domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// JSON blob referenced by a data object's output field
///
/// Processes that compute structured results (counts, embeddings) store
/// them here instead of in the data object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub json: JsonValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_storage() {
        let storage: Storage = serde_json::from_value(json!({
            "id": 5,
            "json": {"embedding": [[0.1, 0.2]]}
        }))
        .unwrap();

        assert_eq!(storage.id, 5);
        assert!(storage.name.is_empty());
        assert_eq!(storage.json["embedding"][0][1], json!(0.2));
    }
}
