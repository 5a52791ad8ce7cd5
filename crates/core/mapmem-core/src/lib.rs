//! mapmem Core Engine
//!
//! This crate provides the core engine and types for a retrieval-augmented
//! mapping memory: accepted field-to-ontology mappings are embedded and
//! stored in a vector index, then retrieved as precedents when similar
//! fields need mapping. It includes:
//!
//! - The [`MappingMemory`] engine (store, retrieve, seed, stats)
//! - Capability traits for the embedding and index services
//! - Canonical document/signature rendering for embedding
//! - Prompt context composition for LLM consumers
//! - Deterministic in-process fakes for tests
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mapmem_core::testing::{InMemoryIndex, TokenEmbedder};
//! use mapmem_core::{
//!     compose_context, FieldDescriptor, MappingMemory, NewMapping, Result, RetrieveOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let embedder = Arc::new(TokenEmbedder::new(64));
//!     let index = Arc::new(InMemoryIndex::new("schema-mappings", 64));
//!     let memory = MappingMemory::new(embedder, index);
//!
//!     let mut mapping = NewMapping::new("Email", "Person.email");
//!     mapping.source_system = "Salesforce".to_string();
//!     mapping.confidence = 0.95;
//!     memory.store(mapping).await?;
//!
//!     let field = FieldDescriptor::new("Email", "string").with_source_system("Salesforce");
//!     let matches = memory.retrieve(&field, RetrieveOptions::default()).await?;
//!     println!("{}", compose_context(&matches));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod identity;
pub mod memory;
pub mod signature;
pub mod testing;
pub mod types;

// Re-export main types
pub use config::{get_env_int, get_env_or, get_required_env, load_env};
pub use context::compose_context;
pub use error::{MapMemError, Result};
pub use filter::confidence_filter;
pub use identity::vector_id;
pub use memory::MappingMemory;
pub use signature::{field_signature, mapping_document};
pub use types::*;
