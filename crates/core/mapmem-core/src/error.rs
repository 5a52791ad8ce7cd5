//! Error types for mapmem

use thiserror::Error;

/// Main error type for mapping-memory operations
#[derive(Debug, Error)]
pub enum MapMemError {
    /// Configuration error (missing credentials, malformed settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vector dimensionality mismatch between a payload and the index
    #[error("Dimension mismatch: {message}. Dimension: {dimension}, Expected: {expected_dimension}")]
    Dimension {
        /// Error message
        message: String,
        /// Dimension of the offending vector
        dimension: usize,
        /// Dimension the index was configured with
        expected_dimension: usize,
    },

    /// Remote index did not become ready within the bounded wait
    #[error("Index '{index}' not ready after {waited_secs}s")]
    IndexNotReady {
        /// Index name
        index: String,
        /// Seconds waited before giving up
        waited_secs: u64,
    },

    /// Remote service failure (embed, upsert, query, stats)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient Result type using MapMemError
pub type Result<T> = std::result::Result<T, MapMemError>;

impl MapMemError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        MapMemError::Config(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        MapMemError::Backend(msg.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension(
        message: impl Into<String>,
        dimension: usize,
        expected_dimension: usize,
    ) -> Self {
        MapMemError::Dimension {
            message: message.into(),
            dimension,
            expected_dimension,
        }
    }

    /// Create an index-not-ready error
    pub fn index_not_ready(index: impl Into<String>, waited_secs: u64) -> Self {
        MapMemError::IndexNotReady {
            index: index.into(),
            waited_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MapMemError::config("missing API key");
        assert_eq!(err.to_string(), "Configuration error: missing API key");

        let err = MapMemError::backend("upsert rejected");
        assert_eq!(err.to_string(), "Backend error: upsert rejected");
    }

    #[test]
    fn test_dimension_error_display() {
        let err = MapMemError::dimension("query vector has wrong dimension", 768, 1024);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: query vector has wrong dimension. Dimension: 768, Expected: 1024"
        );
    }

    #[test]
    fn test_index_not_ready_display() {
        let err = MapMemError::index_not_ready("schema-mappings-e5", 60);
        assert_eq!(
            err.to_string(),
            "Index 'schema-mappings-e5' not ready after 60s"
        );
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: MapMemError = parse_err.into();
        assert!(matches!(err, MapMemError::Serialization(_)));
    }
}
