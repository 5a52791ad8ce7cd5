//! Canonical text renderings for embedding
//!
//! Two renderings feed the embedding model: a rich multi-line document at
//! storage time and a terse signature at query time. The asymmetric model
//! is trained to bridge exactly this gap (passage vs. query), so the two
//! sides deliberately do not mirror each other.
//!
//! Both renderings are part of the persisted contract: changing labels,
//! ordering, or punctuation invalidates comparability with vectors
//! already in the index.

use crate::types::MappingRecord;

/// Render the terse query-time signature for a field.
///
/// Produces "{name} ({type})", prefixed with "{system}: " when a source
/// system is known. An empty system string is treated as absent, so the
/// signature never starts with a dangling colon.
pub fn field_signature(field_name: &str, field_type: &str, source_system: Option<&str>) -> String {
    let signature = format!("{} ({})", field_name, field_type);
    match source_system {
        Some(system) if !system.is_empty() => format!("{}: {}", system, signature),
        _ => signature,
    }
}

/// Render the rich storage-time document for a mapping record.
///
/// Six labeled lines in fixed order, no leading or trailing whitespace.
pub fn mapping_document(record: &MappingRecord) -> String {
    format!(
        "Source: {}\nField: {}\nType: {}\nMapped To: {}\nTransformation: {}\nConfidence: {}",
        record.source_system,
        record.source_field,
        record.source_type,
        record.ontology_entity,
        record.transformation,
        confidence_text(record.confidence),
    )
}

/// Confidence line rendering: integral values keep a trailing ".0"
/// ("Confidence: 1.0", never "Confidence: 1"), matching the documents
/// already embedded in long-lived indexes.
fn confidence_text(confidence: f32) -> String {
    if confidence.fract() == 0.0 {
        format!("{:.1}", confidence)
    } else {
        confidence.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_record() -> MappingRecord {
        MappingRecord {
            source_field: "Email".to_string(),
            source_type: "string".to_string(),
            source_system: "Salesforce".to_string(),
            ontology_entity: "Person.email".to_string(),
            transformation: "lowercase".to_string(),
            confidence: 0.95,
            validated: true,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_signature_without_system() {
        assert_eq!(field_signature("Email", "string", None), "Email (string)");
    }

    #[test]
    fn test_signature_with_system() {
        assert_eq!(
            field_signature("Email", "string", Some("Salesforce")),
            "Salesforce: Email (string)"
        );
    }

    #[test]
    fn test_signature_empty_system_treated_as_absent() {
        let signature = field_signature("Email", "string", Some(""));
        assert_eq!(signature, "Email (string)");
        assert!(!signature.starts_with(':'));
    }

    #[test]
    fn test_document_layout() {
        let document = mapping_document(&sample_record());
        let lines: Vec<&str> = document.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Source: Salesforce");
        assert_eq!(lines[1], "Field: Email");
        assert_eq!(lines[2], "Type: string");
        assert_eq!(lines[3], "Mapped To: Person.email");
        assert_eq!(lines[4], "Transformation: lowercase");
        assert_eq!(lines[5], "Confidence: 0.95");
    }

    #[test]
    fn test_document_has_no_surrounding_whitespace() {
        let document = mapping_document(&sample_record());
        assert_eq!(document, document.trim());
    }

    #[test]
    fn test_document_integral_confidence_keeps_decimal_point() {
        let mut record = sample_record();
        record.confidence = 1.0;
        assert!(mapping_document(&record).ends_with("Confidence: 1.0"));

        record.confidence = 0.0;
        assert!(mapping_document(&record).ends_with("Confidence: 0.0"));

        record.confidence = 0.9;
        assert!(mapping_document(&record).ends_with("Confidence: 0.9"));
    }
}
