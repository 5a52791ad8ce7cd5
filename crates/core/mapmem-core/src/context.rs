//! Prompt context rendering for retrieved mappings
//!
//! Turns retrieval results into the history block that precedes a mapping
//! request in an LLM prompt. Scores are shown as percentages with one
//! decimal place; the numbered layout keeps individual precedents easy for
//! the model to cite.

use crate::types::SimilarityMatch;

/// Header line introducing the history block
const CONTEXT_HEADER: &str = "SIMILAR SUCCESSFUL MAPPINGS FROM HISTORY:\n\n";

/// Closing guidance appended after the matches
const CONTEXT_GUIDANCE: &str =
    "Use these examples to guide your mapping decisions for similar fields.\n\
     Maintain consistency with historical mappings when appropriate.\n";

/// Render retrieved matches into an LLM prompt context block.
///
/// Returns an empty string when there are no matches, so callers can
/// append the result unconditionally.
pub fn compose_context(matches: &[SimilarityMatch]) -> String {
    if matches.is_empty() {
        return String::new();
    }

    let mut context = String::from(CONTEXT_HEADER);

    for (i, m) in matches.iter().enumerate() {
        let record = &m.record;
        context.push_str(&format!("{}. Source: {}\n", i + 1, record.source_system));
        context.push_str(&format!(
            "   Field: {} ({})\n",
            record.source_field, record.source_type
        ));
        context.push_str(&format!("   Mapped To: {}\n", record.ontology_entity));
        context.push_str(&format!(
            "   Transformation: {}\n",
            record.transformation
        ));
        context.push_str(&format!("   Similarity: {}\n", percent(m.similarity)));
        context.push_str(&format!("   Confidence: {}\n", percent(record.confidence)));
        context.push('\n');
    }

    context.push_str(CONTEXT_GUIDANCE);
    context
}

/// Format a unit-interval score as a percentage with one decimal place
fn percent(value: f32) -> String {
    format!("{:.1}%", f64::from(value) * 100.0)
}
