//! Graph store abstraction
//!
//! The retrieval core consumes an `EntityStore` and never talks to a graph
//! database directly. Backends (Neo4j, SPARQL endpoints, the in-memory
//! store) implement this trait and are expected to score lexical search
//! results per the weighting policy documented in `store::memory`.

pub mod memory;

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{EntityResult, SearchFilters};

pub use memory::{InMemoryEntityStore, StoredEntity, LEXICAL_SCORE_CEILING};

/// Abstraction over the graph backing store
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Lexical search, returning entities scored by the store's
    /// field-priority weighting, ordered by descending score
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<EntityResult>>;

    /// Look up a single entity by its identifier
    async fn get_by_id(&self, entity_id: &str) -> Result<Option<EntityResult>>;

    /// Entities reachable from the given entity via relationships,
    /// up to `max_depth` hops
    async fn get_related(&self, entity_id: &str, max_depth: usize) -> Result<Vec<EntityResult>>;
}
