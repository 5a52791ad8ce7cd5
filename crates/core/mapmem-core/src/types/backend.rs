//! Capability traits for the embedding and vector-index services
//!
//! The engine talks to its hosted backend exclusively through these two
//! traits, so any service with equivalent semantics (or an in-process fake,
//! see [`crate::testing`]) can stand in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::mapping::MappingRecord;

/// Embedding generation mode
///
/// Asymmetric embedding models encode indexed content and search input
/// differently; the mode is passed through to the service as its
/// input-type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Indexed content (the service's "passage" input type)
    Document,
    /// Search input (the service's "query" input type)
    Query,
}

impl EmbeddingMode {
    /// Input-type hint sent to the embedding service
    pub fn input_type(&self) -> &'static str {
        match self {
            EmbeddingMode::Document => "passage",
            EmbeddingMode::Query => "query",
        }
    }
}

/// One vector to upsert, keyed by its identity and carrying the full
/// mapping record as index metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Vector identity
    pub id: String,

    /// Embedding values
    pub values: Vec<f32>,

    /// The stored mapping, persisted as metadata next to the vector
    pub metadata: MappingRecord,
}

/// One scored nearest-neighbor match from the index
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Vector identity
    pub id: String,

    /// Raw similarity score as reported by the index
    pub score: f32,

    /// Stored metadata, when the index returned it in a readable shape
    pub metadata: Option<MappingRecord>,
}

/// Aggregate statistics for an index
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub total_vector_count: usize,

    /// Index dimensionality, when the service reports it
    pub dimension: Option<usize>,
}

/// Hosted embedding capability
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text in the given mode
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>>;

    /// Identifier of the embedding model
    fn model(&self) -> &str;

    /// Fixed output dimensionality of the model
    fn dimension(&self) -> usize;
}

/// Vector index capability
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite vectors by identity
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Top-k nearest-neighbor search with an optional metadata filter.
    ///
    /// Matches come back in the service's descending-score order with
    /// stored metadata included.
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<Vec<ScoredMatch>>;

    /// Aggregate statistics for the index
    async fn describe_stats(&self) -> Result<IndexStats>;

    /// Name of the index
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_mode_input_type() {
        assert_eq!(EmbeddingMode::Document.input_type(), "passage");
        assert_eq!(EmbeddingMode::Query.input_type(), "query");
    }
}
