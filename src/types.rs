//! Canonical entity result schema shared by all retrievers
//!
//! Every retriever normalizes its output into `EntityResult` so that
//! fusion and reranking operate on one schema regardless of which
//! strategy produced a candidate.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Maximum snippet length before truncation
const SNIPPET_MAX_LEN: usize = 200;

/// A single retrieved entity with its relevance score
///
/// `score` is retriever-local until fusion, then pipeline-global. Lexical
/// and semantic retrievers normalize into [0, 1] before fusion; fused and
/// reranked scores are ordering keys valid only within one retrieve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityResult {
    /// Opaque, store-assigned entity identifier
    pub id: String,
    /// Display name
    pub label: String,
    /// Entity type (Disease, Country, Outbreak, Organization, ...)
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Relevance score
    pub score: f64,
    /// Short description snippet
    pub snippet: String,
    /// Additional properties from the graph
    #[serde(default)]
    pub properties: HashMap<String, JsonValue>,
}

impl EntityResult {
    /// Create a result with an empty snippet and no properties
    pub fn new(id: &str, label: &str, entity_type: &str, score: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            entity_type: entity_type.to_string(),
            score,
            snippet: String::new(),
            properties: HashMap::new(),
        }
    }

    /// Fill in the snippet from entity properties if it is empty
    ///
    /// Priority: description property, then a "key: value" join of the
    /// first few properties, then a type-based default.
    pub fn ensure_snippet(&mut self) {
        if !self.snippet.is_empty() {
            return;
        }
        self.snippet = generate_snippet(&self.properties, &self.entity_type);
    }
}

/// Generate a short description snippet from entity properties
pub fn generate_snippet(properties: &HashMap<String, JsonValue>, entity_type: &str) -> String {
    if let Some(JsonValue::String(desc)) = properties.get("description") {
        if desc.len() > SNIPPET_MAX_LEN {
            let cut = desc
                .char_indices()
                .take_while(|(i, _)| *i < SNIPPET_MAX_LEN)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            return format!("{}...", &desc[..cut]);
        }
        return desc.clone();
    }

    // Build from the first few non-identity properties
    let mut parts: Vec<String> = properties
        .iter()
        .filter(|(k, v)| !matches!(k.as_str(), "id" | "label" | "type") && !v.is_null())
        .map(|(k, v)| match v {
            JsonValue::String(s) => format!("{}: {}", k, s),
            other => format!("{}: {}", k, other),
        })
        .collect();
    parts.sort();
    parts.truncate(3);

    if !parts.is_empty() {
        return parts.join(" | ");
    }

    format!("{} from knowledge graph", entity_type)
}

/// Filters constraining a lexical search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict results to a single entity type
    pub entity_type: Option<String>,
}

impl SearchFilters {
    /// Filter to a single entity type
    pub fn by_type(entity_type: &str) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
        }
    }

    /// True when the entity passes all configured filters
    pub fn matches(&self, entity_type: &str) -> bool {
        match &self.entity_type {
            Some(t) => t.eq_ignore_ascii_case(entity_type),
            None => true,
        }
    }
}

/// Clamp a score into the [0, 1] range
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

/// Deterministic ranking order: descending score, ties broken by
/// ascending case-insensitive label
pub fn rank_ordering(a: &EntityResult, b: &EntityResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
}
