//! Deterministic in-process fakes for exercising the engine without the
//! hosted embedding and index services.
//!
//! [`TokenEmbedder`] gives texts that share tokens a genuinely higher
//! cosine similarity, so ranking behavior is observable in tests, and
//! [`InMemoryIndex`] answers queries with the same ordering and filter
//! semantics the real index has.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MapMemError, Result};
use crate::types::{
    EmbeddingMode, EmbeddingProvider, IndexStats, ScoredMatch, VectorIndex, VectorRecord,
};

/// Deterministic bag-of-tokens embedder.
///
/// Each distinct token is assigned its own vector slot on first sight, so
/// two texts overlap exactly where their token sets overlap and identical
/// texts embed to identical unit vectors. Counts embedding calls so tests
/// can assert when the engine skips embedding entirely.
pub struct TokenEmbedder {
    dimension: usize,
    vocabulary: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
}

impl TokenEmbedder {
    /// Create an embedder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vocabulary: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of embed calls made so far
    pub fn embed_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bag_of_tokens(&self, text: &str) -> Vec<f32> {
        let mut vocabulary = self.vocabulary.lock().unwrap();
        let mut values = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let next_slot = vocabulary.len() % self.dimension;
            let slot = *vocabulary
                .entry(token.to_lowercase())
                .or_insert(next_slot);
            values[slot] += 1.0;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl EmbeddingProvider for TokenEmbedder {
    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bag_of_tokens(text))
    }

    fn model(&self) -> &str {
        "token-bag-test"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Brute-force in-memory stand-in for the remote vector index.
///
/// Upserts overwrite by identity, queries rank every stored vector by
/// cosine similarity, honor the confidence filter and return metadata
/// with each match.
pub struct InMemoryIndex {
    name: String,
    dimension: usize,
    records: Mutex<Vec<VectorRecord>>,
}

impl InMemoryIndex {
    /// Create an empty index with the given name and dimension
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        for record in records {
            if record.values.len() != self.dimension {
                return Err(MapMemError::dimension(
                    "upsert vector has wrong dimension",
                    record.values.len(),
                    self.dimension,
                ));
            }
        }

        let mut stored = self.records.lock().unwrap();
        for record in records {
            if let Some(existing) = stored.iter_mut().find(|r| r.id == record.id) {
                *existing = record.clone();
            } else {
                stored.push(record.clone());
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<ScoredMatch>> {
        if vector.len() != self.dimension {
            return Err(MapMemError::dimension(
                "query vector has wrong dimension",
                vector.len(),
                self.dimension,
            ));
        }

        let min_confidence = filter
            .as_ref()
            .and_then(|f| f.get("confidence"))
            .and_then(|c| c.get("$gte"))
            .and_then(Value::as_f64);

        let stored = self.records.lock().unwrap();
        let mut matches: Vec<ScoredMatch> = stored
            .iter()
            .filter(|r| {
                min_confidence.map_or(true, |min| f64::from(r.metadata.confidence) >= min)
            })
            .map(|r| ScoredMatch {
                id: r.id.clone(),
                score: cosine_similarity(&vector, &r.values),
                metadata: Some(r.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let stored = self.records.lock().unwrap();
        Ok(IndexStats {
            total_vector_count: stored.len(),
            dimension: Some(self.dimension),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
