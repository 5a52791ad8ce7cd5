//! Server-side metadata filter construction

use serde_json::{json, Value};

/// Build the confidence push-down filter for a similarity query.
///
/// Filtering happens inside the index so low-confidence history never
/// occupies a top-k slot. Thresholds at or below zero disable the filter
/// entirely.
pub fn confidence_filter(min_confidence: f32) -> Option<Value> {
    if min_confidence > 0.0 {
        Some(json!({ "confidence": { "$gte": min_confidence } }))
    } else {
        None
    }
}
