//! Stable vector identities for stored mappings

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Hex length of a vector identity
const ID_HEX_LEN: usize = 16;

/// Derive the identity for a stored mapping.
///
/// Hashes "{system}_{field}_{unix_seconds}" and keeps the first 16 hex
/// characters. The write instant is part of the input, so repeated stores
/// of the same field at different seconds get distinct identities: the
/// index is an append-only log of mapping events, not a keyed table.
pub fn vector_id(source_system: &str, source_field: &str, at: DateTime<Utc>) -> String {
    let seed = format!("{}_{}_{}", source_system, source_field, at.timestamp());
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(&digest[..ID_HEX_LEN / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_is_16_hex_chars() {
        let id = vector_id("Salesforce", "Email", Utc::now());
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_second_same_id() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        assert_eq!(
            vector_id("Salesforce", "Email", at),
            vector_id("Salesforce", "Email", at)
        );
    }

    #[test]
    fn test_next_second_changes_id() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let later = at + chrono::Duration::seconds(1);
        assert_ne!(
            vector_id("Salesforce", "Email", at),
            vector_id("Salesforce", "Email", later)
        );
    }

    #[test]
    fn test_distinct_fields_get_distinct_ids() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        assert_ne!(
            vector_id("Salesforce", "Email", at),
            vector_id("Salesforce", "Phone", at)
        );
        assert_ne!(
            vector_id("Salesforce", "Email", at),
            vector_id("HubSpot", "Email", at)
        );
    }
}
