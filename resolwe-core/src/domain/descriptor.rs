//! Descriptor schema domain types

use serde::{Deserialize, Serialize};

/// Schema describing the annotation fields of a data object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSchema {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: Vec<SchemaField>,
}

/// One field (or group of fields) of a descriptor schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub group: Vec<SchemaField>,
}

impl DescriptorSchema {
    /// Fields of the `tabular` group, used as listing columns
    pub fn tabular_fields(&self) -> &[SchemaField] {
        self.schema
            .iter()
            .find(|field| field.name == "tabular")
            .map(|field| field.group.as_slice())
            .unwrap_or(&[])
    }
}

impl SchemaField {
    /// Label to display, falling back to the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tabular_fields() {
        let schema: DescriptorSchema = serde_json::from_value(json!({
            "id": 1,
            "slug": "data_info",
            "schema": [
                {"name": "tabular", "label": "Tabular", "group": [
                    {"name": "title", "label": "Title", "type": "basic:string:"},
                    {"name": "cells"}
                ]},
                {"name": "other", "group": []}
            ]
        }))
        .unwrap();

        let fields = schema.tabular_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].display_label(), "Title");
        assert_eq!(fields[1].display_label(), "cells");
    }

    #[test]
    fn test_missing_tabular_group() {
        let schema: DescriptorSchema =
            serde_json::from_value(json!({"id": 2, "slug": "empty"})).unwrap();
        assert!(schema.tabular_fields().is_empty());
    }
}
