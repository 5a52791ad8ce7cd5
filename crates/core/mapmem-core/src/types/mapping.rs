//! Mapping records and retrieval types
//!
//! The field names of [`MappingRecord`] double as the metadata keys stored
//! alongside each vector in the index, so they are part of the persisted
//! contract and must stay stable across releases.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accepted field-to-ontology mapping, as persisted in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Field name in the source system (e.g. "Email")
    pub source_field: String,

    /// Declared type of the source field (e.g. "string")
    pub source_type: String,

    /// System the field came from (e.g. "Salesforce")
    pub source_system: String,

    /// Target ontology entity (e.g. "Person.email")
    pub ontology_entity: String,

    /// Transformation applied during the mapping (e.g. "direct", "lowercase")
    pub transformation: String,

    /// Confidence assigned when the mapping was accepted, nominally 0.0..=1.0
    pub confidence: f32,

    /// Whether a human validated the mapping
    pub validated: bool,

    /// When the mapping was stored.
    ///
    /// Reads both offset-carrying RFC 3339 strings and the naive ISO-8601
    /// form earlier writers stored (taken as UTC).
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Stored metadata carries timestamps in two shapes: this engine writes
/// RFC 3339 with an offset, while earlier writers stored naive ISO-8601.
/// Naive values are read as UTC so neither generation of records is
/// dropped at query time.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
        })
        .map_err(serde::de::Error::custom)
}

/// A mapping submitted for storage; the engine assigns the timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMapping {
    /// Field name in the source system
    pub source_field: String,

    /// Declared type of the source field
    pub source_type: String,

    /// System the field came from
    pub source_system: String,

    /// Target ontology entity
    pub ontology_entity: String,

    /// Transformation applied during the mapping
    pub transformation: String,

    /// Confidence assigned when the mapping was accepted
    pub confidence: f32,

    /// Whether a human validated the mapping
    pub validated: bool,
}

impl NewMapping {
    /// Create a mapping submission with defaults for everything except the
    /// field and its target entity
    pub fn new(source_field: impl Into<String>, ontology_entity: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            ontology_entity: ontology_entity.into(),
            ..Default::default()
        }
    }
}

impl Default for NewMapping {
    fn default() -> Self {
        Self {
            source_field: String::new(),
            source_type: "string".to_string(),
            source_system: "Unknown".to_string(),
            ontology_entity: String::new(),
            transformation: "direct".to_string(),
            confidence: 1.0,
            validated: false,
        }
    }
}

/// A field to find historical precedents for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name in the source system
    pub field_name: String,

    /// Declared type of the field
    pub field_type: String,

    /// System the field came from, when known
    pub source_system: Option<String>,
}

impl FieldDescriptor {
    /// Create a field descriptor without a source system
    pub fn new(field_name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_type: field_type.into(),
            source_system: None,
        }
    }

    /// Attach the source system the field came from
    pub fn with_source_system(mut self, source_system: impl Into<String>) -> Self {
        self.source_system = Some(source_system.into());
        self
    }
}

/// Retrieval tuning knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrieveOptions {
    /// Maximum number of matches to return
    pub top_k: usize,

    /// Minimum stored confidence; values at or below zero disable the filter
    pub min_confidence: f32,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_confidence: 0.7,
        }
    }
}

/// A retrieved mapping together with its similarity to the query field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    /// The stored mapping
    #[serde(flatten)]
    pub record: MappingRecord,

    /// Cosine similarity to the query field, rounded to three decimals
    pub similarity: f32,
}

/// Aggregate view of the memory and its backing services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Number of mappings stored in the index
    pub total_mappings: usize,

    /// Name of the backing index
    pub index_name: String,

    /// Embedding model the memory was configured with
    pub embedding_model: String,

    /// Embedding dimensionality
    pub embedding_dimension: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record_json(timestamp: &str) -> serde_json::Value {
        serde_json::json!({
            "source_field": "Email",
            "source_type": "string",
            "source_system": "Salesforce",
            "ontology_entity": "Person.email",
            "transformation": "direct",
            "confidence": 0.95,
            "validated": true,
            "timestamp": timestamp
        })
    }

    #[test]
    fn test_new_mapping_defaults() {
        let mapping = NewMapping::new("Email", "Person.email");
        assert_eq!(mapping.source_field, "Email");
        assert_eq!(mapping.ontology_entity, "Person.email");
        assert_eq!(mapping.source_type, "string");
        assert_eq!(mapping.source_system, "Unknown");
        assert_eq!(mapping.transformation, "direct");
        assert_eq!(mapping.confidence, 1.0);
        assert!(!mapping.validated);
    }

    #[test]
    fn test_field_descriptor_builder() {
        let field = FieldDescriptor::new("Email", "string").with_source_system("Salesforce");
        assert_eq!(field.field_name, "Email");
        assert_eq!(field.field_type, "string");
        assert_eq!(field.source_system.as_deref(), Some("Salesforce"));
    }

    #[test]
    fn test_retrieve_options_default() {
        let opts = RetrieveOptions::default();
        assert_eq!(opts.top_k, 5);
        assert_eq!(opts.min_confidence, 0.7);
    }

    #[test]
    fn test_similarity_match_flattens_record() {
        let m = SimilarityMatch {
            record: MappingRecord {
                source_field: "Email".to_string(),
                source_type: "string".to_string(),
                source_system: "Salesforce".to_string(),
                ontology_entity: "Person.email".to_string(),
                transformation: "lowercase".to_string(),
                confidence: 0.95,
                validated: true,
                timestamp: Utc::now(),
            },
            similarity: 0.847,
        };

        let json = serde_json::to_value(&m).unwrap();
        // record fields sit at the top level next to the similarity score
        assert_eq!(json["source_field"], "Email");
        assert_eq!(json["ontology_entity"], "Person.email");
        assert!(json["similarity"].as_f64().is_some());
    }

    #[test]
    fn test_mapping_record_round_trip() {
        let record = MappingRecord {
            source_field: "Phone".to_string(),
            source_type: "string".to_string(),
            source_system: "HubSpot".to_string(),
            ontology_entity: "Person.phone".to_string(),
            transformation: "e164".to_string(),
            confidence: 0.9,
            validated: false,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: MappingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_timestamp_reads_naive_and_offset_forms_alike() {
        let naive: MappingRecord =
            serde_json::from_value(record_json("2024-05-01T12:30:45.123456")).unwrap();
        let offset: MappingRecord =
            serde_json::from_value(record_json("2024-05-01T14:30:45.123456+02:00")).unwrap();

        assert_eq!(naive.timestamp, offset.timestamp);
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + Duration::microseconds(123_456);
        assert_eq!(naive.timestamp, expected);
    }

    #[test]
    fn test_timestamp_without_fraction_parses() {
        let record: MappingRecord =
            serde_json::from_value(record_json("2024-05-01T12:30:45")).unwrap();
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
        );
    }

    #[test]
    fn test_timestamp_rejects_unparseable_text() {
        assert!(serde_json::from_value::<MappingRecord>(record_json("yesterday")).is_err());
    }
}
