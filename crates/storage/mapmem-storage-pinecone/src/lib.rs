//! Pinecone backend for mapmem
//!
//! Implements the core capability traits against Pinecone's hosted
//! services: the inference API for embeddings ([`PineconeInference`]) and
//! a serverless index for storage and search ([`PineconeIndex`]). Index
//! lifecycle (create if absent, bounded readiness wait, dimension check)
//! happens once at connect time; afterwards the engine can assume a ready
//! index.
//!
//! # Example
//!
//! ```no_run
//! use mapmem_core::{load_env, MappingMemory, Result};
//! use mapmem_storage_pinecone::{connect, PineconeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     load_env().ok();
//!     let config = PineconeConfig::from_env()?;
//!     let (embedder, index) = connect(&config).await?;
//!     let memory = MappingMemory::new(embedder, index);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod index;
mod inference;

pub use index::PineconeIndex;
pub use inference::PineconeInference;

use std::sync::Arc;

use mapmem_core::{get_env_int, get_env_or, get_required_env, MapMemError, Result};
use reqwest::{header, Client};

/// Pinecone API version sent with every request
const API_VERSION: &str = "2025-01";

/// Pinecone configuration
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key for both the inference and index services
    pub api_key: String,
    /// Name of the serverless index
    pub index_name: String,
    /// Hosted embedding model
    pub model: String,
    /// Embedding dimensionality; must match both the model and the index
    pub dimension: usize,
    /// Cloud provider used when the index has to be created
    pub cloud: String,
    /// Cloud region used when the index has to be created
    pub region: String,
    /// Control-plane base URL
    pub controller_url: String,
}

impl PineconeConfig {
    /// Create a configuration with the service defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_name: "schema-mappings-e5".to_string(),
            model: "multilingual-e5-large".to_string(),
            dimension: 1024,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            controller_url: "https://api.pinecone.io".to_string(),
        }
    }

    /// Build a configuration from PINECONE_* environment variables.
    ///
    /// PINECONE_API_KEY is required; everything else falls back to the
    /// service defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(get_required_env("PINECONE_API_KEY")?);
        config.index_name = get_env_or("PINECONE_INDEX", &config.index_name);
        config.model = get_env_or("PINECONE_EMBEDDING_MODEL", &config.model);
        config.dimension = get_env_int("PINECONE_EMBEDDING_DIMENSION", config.dimension);
        config.cloud = get_env_or("PINECONE_CLOUD", &config.cloud);
        config.region = get_env_or("PINECONE_REGION", &config.region);
        Ok(config)
    }

    /// Use a different index name
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Use a different embedding model and its dimensionality
    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }
}

/// Build an HTTP client with the Pinecone auth and version headers
pub(crate) fn api_client(api_key: &str) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        "Api-Key",
        header::HeaderValue::from_str(api_key)
            .map_err(|e| MapMemError::config(format!("Invalid API key: {}", e)))?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        "X-Pinecone-API-Version",
        header::HeaderValue::from_static(API_VERSION),
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| MapMemError::backend(format!("Failed to create HTTP client: {}", e)))
}

/// Connect both capabilities from one configuration.
///
/// Ensures the index exists and is ready before returning, so the pair can
/// be handed straight to [`mapmem_core::MappingMemory::new`].
pub async fn connect(
    config: &PineconeConfig,
) -> Result<(Arc<PineconeInference>, Arc<PineconeIndex>)> {
    let inference = Arc::new(PineconeInference::new(config)?);
    let index = Arc::new(PineconeIndex::ensure(config).await?);
    Ok((inference, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_defaults() {
        let config = PineconeConfig::new("key");
        assert_eq!(config.index_name, "schema-mappings-e5");
        assert_eq!(config.model, "multilingual-e5-large");
        assert_eq!(config.dimension, 1024);
        assert_eq!(config.cloud, "aws");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.controller_url, "https://api.pinecone.io");
    }

    #[test]
    fn test_config_builders() {
        let config = PineconeConfig::new("key")
            .with_index("custom-index")
            .with_model("llama-text-embed-v2", 2048);
        assert_eq!(config.index_name, "custom-index");
        assert_eq!(config.model, "llama-text-embed-v2");
        assert_eq!(config.dimension, 2048);
    }

    #[test]
    fn test_from_env_requires_api_key() {
        env::remove_var("PINECONE_API_KEY");
        let err = PineconeConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PINECONE_API_KEY"));

        env::set_var("PINECONE_API_KEY", "test-key");
        let config = PineconeConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-key");
        env::remove_var("PINECONE_API_KEY");
    }

    #[test]
    fn test_api_client_rejects_invalid_key() {
        let err = api_client("bad\nkey").unwrap_err();
        assert!(matches!(err, MapMemError::Config(_)));
    }
}
