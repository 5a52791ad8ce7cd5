//! Core type definitions for mapmem

pub mod backend;
pub mod mapping;
pub mod schema;

// Re-export commonly used types
pub use backend::*;
pub use mapping::*;
pub use schema::*;
