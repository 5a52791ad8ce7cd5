//! Seed catalog types
//!
//! Deployments usually start with a hand-curated list of known-good
//! mappings for a source system. These types describe that catalog:
//! per-table field listings plus the subset of "Table.field" keys with an
//! agreed ontology target.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared fields of one source table, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Field name to declared type
    #[serde(default)]
    pub schema: BTreeMap<String, String>,
}

impl TableSchema {
    /// Build a table schema from (field, type) pairs
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            schema: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An agreed mapping for one "Table.field" key in the seed catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownMapping {
    /// Target ontology entity
    pub entity: String,

    /// Transformation to record, defaults to "direct" when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    /// Confidence to record, defaults to 0.9 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl KnownMapping {
    /// Create a known mapping with catalog defaults for transform and
    /// confidence
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            transform: None,
            confidence: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_schema_from_fields() {
        let table = TableSchema::from_fields([("Email", "string"), ("Age", "integer")]);
        assert_eq!(table.schema.get("Email").map(String::as_str), Some("string"));
        assert_eq!(table.schema.get("Age").map(String::as_str), Some("integer"));
    }

    #[test]
    fn test_table_schema_parses_without_schema_key() {
        let table: TableSchema = serde_json::from_str("{}").unwrap();
        assert!(table.schema.is_empty());
    }

    #[test]
    fn test_known_mapping_optional_fields() {
        let parsed: KnownMapping =
            serde_json::from_str(r#"{"entity": "Person.email"}"#).unwrap();
        assert_eq!(parsed.entity, "Person.email");
        assert!(parsed.transform.is_none());
        assert!(parsed.confidence.is_none());

        let full: KnownMapping = serde_json::from_str(
            r#"{"entity": "Person.phone", "transform": "e164", "confidence": 0.85}"#,
        )
        .unwrap();
        assert_eq!(full.transform.as_deref(), Some("e164"));
        assert_eq!(full.confidence, Some(0.85));
    }
}
