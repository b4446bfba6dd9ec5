//! epigraph - Hybrid entity retrieval over an epidemiology knowledge graph
//!
//! Answers natural-language queries over a property graph of entities
//! (diseases, countries, outbreaks, organizations) by returning a ranked
//! list of matching entities.
//!
//! # Architecture
//!
//! - Keyword and semantic retrievers produce independent ranked lists
//! - Reciprocal Rank Fusion merges them from rank positions alone
//! - An optional cross-encoder reranker reorders a capped candidate pool
//!
//! The crate never generates text; it only retrieves and ranks entities.
//! Graph storage, embedding, and reranking backends are consumed through
//! the `EntityStore`, `EmbeddingService`, and `RerankingService` traits.

pub mod config;
pub mod errors;
pub mod types;

// Service seams consumed by the pipeline
pub mod embedding;
pub mod reranking;
pub mod store;

// The retrieval and ranking core
pub mod retrieval;

// Re-export commonly used types
pub use errors::{Result, RetrievalError};
pub use retrieval::{HybridRetriever, KeywordRetriever, RetrieveOptions, Retriever, SemanticRetriever};
pub use types::{EntityResult, SearchFilters};
