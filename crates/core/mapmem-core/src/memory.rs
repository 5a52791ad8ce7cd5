//! The mapping-memory engine
//!
//! Orchestrates the write path (render, embed as passage, upsert), the
//! read path (signature, embed as query, filtered top-k, merge) and bulk
//! seeding from a schema catalog. All service traffic goes through the
//! [`EmbeddingProvider`] and [`VectorIndex`] traits.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::Result;
use crate::filter::confidence_filter;
use crate::identity::vector_id;
use crate::signature::{field_signature, mapping_document};
use crate::types::{
    EmbeddingMode, EmbeddingProvider, FieldDescriptor, KnownMapping, MappingRecord, MemoryStats,
    NewMapping, RetrieveOptions, SimilarityMatch, TableSchema, VectorIndex, VectorRecord,
};

/// Retrieval-augmented memory of accepted field-to-ontology mappings
pub struct MappingMemory {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl MappingMemory {
    /// Create a mapping memory over the given embedding and index services
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Store an accepted mapping and return its vector identity.
    ///
    /// Each call appends one immutable entry. Re-mapping the same field
    /// later accumulates additional evidence instead of overwriting the
    /// earlier decision.
    pub async fn store(&self, mapping: NewMapping) -> Result<String> {
        let record = MappingRecord {
            source_field: mapping.source_field,
            source_type: mapping.source_type,
            source_system: mapping.source_system,
            ontology_entity: mapping.ontology_entity,
            transformation: mapping.transformation,
            confidence: mapping.confidence,
            validated: mapping.validated,
            timestamp: Utc::now(),
        };

        let document = mapping_document(&record);
        let values = self
            .embedder
            .embed(&document, EmbeddingMode::Document)
            .await?;
        let id = vector_id(&record.source_system, &record.source_field, record.timestamp);

        let entry = VectorRecord {
            id: id.clone(),
            values,
            metadata: record,
        };
        self.index.upsert(std::slice::from_ref(&entry)).await?;

        info!(
            "Stored mapping: {} -> {}",
            entry.metadata.source_field, entry.metadata.ontology_entity
        );
        Ok(id)
    }

    /// Retrieve historical mappings similar to the given field.
    ///
    /// Returns matches in descending similarity order, at most
    /// `opts.top_k` of them, each carrying the stored record plus a
    /// similarity rounded to three decimals. An empty index answers
    /// immediately without an embedding call.
    pub async fn retrieve(
        &self,
        field: &FieldDescriptor,
        opts: RetrieveOptions,
    ) -> Result<Vec<SimilarityMatch>> {
        if opts.top_k == 0 {
            return Ok(Vec::new());
        }

        let stats = self.index.describe_stats().await?;
        if stats.total_vector_count == 0 {
            debug!("No historical mappings stored yet");
            return Ok(Vec::new());
        }

        let signature = field_signature(
            &field.field_name,
            &field.field_type,
            field.source_system.as_deref(),
        );
        let values = self.embedder.embed(&signature, EmbeddingMode::Query).await?;

        let matches = self
            .index
            .query(values, opts.top_k, confidence_filter(opts.min_confidence))
            .await?;

        // matches without readable metadata cannot be merged into results
        let results: Vec<SimilarityMatch> = matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|record| SimilarityMatch {
                    record,
                    similarity: round_similarity(m.score),
                })
            })
            .collect();

        info!(
            "Found {} similar mappings for '{}'",
            results.len(),
            field.field_name
        );
        Ok(results)
    }

    /// Seed the memory from a schema catalog.
    ///
    /// Walks every declared field of every table, stores those with an
    /// agreed mapping under the "{table}.{field}" key and silently skips
    /// the rest. Seeded entries are validated, with catalog defaults of
    /// "direct" transformation and 0.9 confidence. Returns the number of
    /// mappings stored.
    pub async fn seed_from_schema(
        &self,
        source_system: &str,
        tables: &BTreeMap<String, TableSchema>,
        known_mappings: &HashMap<String, KnownMapping>,
    ) -> Result<usize> {
        let mut seeded = 0;

        for (table_name, table) in tables {
            for (field_name, field_type) in &table.schema {
                let key = format!("{}.{}", table_name, field_name);
                if let Some(known) = known_mappings.get(&key) {
                    self.store(NewMapping {
                        source_field: field_name.clone(),
                        source_type: field_type.clone(),
                        source_system: source_system.to_string(),
                        ontology_entity: known.entity.clone(),
                        transformation: known
                            .transform
                            .clone()
                            .unwrap_or_else(|| "direct".to_string()),
                        confidence: known.confidence.unwrap_or(0.9),
                        validated: true,
                    })
                    .await?;
                    seeded += 1;
                }
            }
        }

        info!("Seeded {} mappings from {} schema", seeded, source_system);
        Ok(seeded)
    }

    /// Aggregate view of the memory and its backing services
    pub async fn stats(&self) -> Result<MemoryStats> {
        let stats = self.index.describe_stats().await?;
        Ok(MemoryStats {
            total_mappings: stats.total_vector_count,
            index_name: self.index.name().to_string(),
            embedding_model: self.embedder.model().to_string(),
            embedding_dimension: self.embedder.dimension(),
        })
    }
}

/// Round a raw index score to three decimals for presentation
fn round_similarity(score: f32) -> f32 {
    ((f64::from(score) * 1000.0).round() / 1000.0) as f32
}
