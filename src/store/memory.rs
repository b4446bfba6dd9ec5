//! In-memory entity store
//!
//! Reference implementation of the lexical scoring policy that every
//! `EntityStore` backend must follow. Also serves as the in-process
//! backend for tests and deployments without a graph database.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::Result;
use crate::types::{generate_snippet, EntityResult, SearchFilters};

use super::EntityStore;

// Per-token weights by match tier. A token contributes its best tier only.
const WEIGHT_EXACT_ID: f64 = 3.0;
const WEIGHT_LABEL_PREFIX: f64 = 2.0;
const WEIGHT_PRIMARY_FIELD: f64 = 1.5;
const WEIGHT_SECONDARY_FIELD: f64 = 0.75;

/// Fixed bonus when a query token names the entity's type
const TYPE_KEYWORD_BONUS: f64 = 0.5;

/// Multiplier when the full query phrase appears verbatim
const PHRASE_MATCH_MULTIPLIER: f64 = 1.25;

/// Maximum attainable raw lexical score: every token an exact id/code
/// match (3.0 mean), plus the type bonus (0.5), times the phrase
/// multiplier (1.25). Retrievers divide by this ceiling to normalize
/// into [0, 1]. Must be re-derived if the weights above change.
pub const LEXICAL_SCORE_CEILING: f64 = (WEIGHT_EXACT_ID + TYPE_KEYWORD_BONUS) * PHRASE_MATCH_MULTIPLIER;

/// An entity record held by the in-memory store
#[derive(Debug, Clone)]
pub struct StoredEntity {
    pub id: String,
    pub label: String,
    pub entity_type: String,
    /// Classification code (ICD code, ISO country code, ...)
    pub code: Option<String>,
    pub properties: HashMap<String, JsonValue>,
}

impl StoredEntity {
    pub fn new(id: &str, label: &str, entity_type: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            entity_type: entity_type.to_string(),
            code: None,
            properties: HashMap::new(),
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_property(mut self, key: &str, value: JsonValue) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// All searchable text of this entity, lowercased and concatenated
    fn searchable_text(&self) -> String {
        let mut text = self.label.to_lowercase();
        if let Some(code) = &self.code {
            text.push(' ');
            text.push_str(&code.to_lowercase());
        }
        for value in self.properties.values() {
            if let JsonValue::String(s) = value {
                text.push(' ');
                text.push_str(&s.to_lowercase());
            }
        }
        text
    }

    fn to_result(&self, score: f64) -> EntityResult {
        let mut result = EntityResult {
            id: self.id.clone(),
            label: self.label.clone(),
            entity_type: self.entity_type.clone(),
            score,
            snippet: generate_snippet(&self.properties, &self.entity_type),
            properties: self.properties.clone(),
        };
        if let Some(code) = &self.code {
            result
                .properties
                .entry("code".to_string())
                .or_insert_with(|| JsonValue::String(code.clone()));
        }
        result
    }
}

/// In-memory graph store with relationship edges
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: HashMap<String, StoredEntity>,
    /// Undirected relationship edges between entity ids
    edges: HashMap<String, Vec<String>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity
    pub fn insert(&mut self, entity: StoredEntity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    /// Add an undirected relationship between two entities
    pub fn relate(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.edges
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Raw lexical score for one entity against the tokenized query
    ///
    /// Each token contributes its best matching tier; the per-token sum is
    /// averaged over the token count so scores stay comparable across
    /// queries of different lengths. A type-keyword match adds a fixed
    /// bonus, and a verbatim phrase match multiplies the total.
    fn score_entity(&self, entity: &StoredEntity, tokens: &[String], phrase: &str) -> f64 {
        let label_lower = entity.label.to_lowercase();
        let id_lower = entity.id.to_lowercase();
        let code_lower = entity.code.as_deref().map(str::to_lowercase);
        let type_lower = entity.entity_type.to_lowercase();
        let searchable = entity.searchable_text();

        let secondary_text: String = entity
            .properties
            .values()
            .filter_map(|v| v.as_str())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        let mut token_sum = 0.0;
        let mut type_matched = false;

        for token in tokens {
            if token == &type_lower {
                type_matched = true;
            }

            let tier = if token == &id_lower || code_lower.as_deref() == Some(token.as_str()) {
                WEIGHT_EXACT_ID
            } else if label_lower.starts_with(token.as_str()) {
                WEIGHT_LABEL_PREFIX
            } else if label_lower.contains(token.as_str())
                || code_lower
                    .as_deref()
                    .map(|c| c.contains(token.as_str()))
                    .unwrap_or(false)
            {
                WEIGHT_PRIMARY_FIELD
            } else if secondary_text.contains(token.as_str()) {
                WEIGHT_SECONDARY_FIELD
            } else {
                0.0
            };

            token_sum += tier;
        }

        let mut score = token_sum / tokens.len() as f64;
        if type_matched {
            score += TYPE_KEYWORD_BONUS;
        }
        if tokens.len() > 1 && searchable.contains(phrase) {
            score *= PHRASE_MATCH_MULTIPLIER;
        }

        score
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<EntityResult>> {
        let tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let phrase = tokens.join(" ");

        let mut results: Vec<EntityResult> = self
            .entities
            .values()
            .filter(|e| {
                filters
                    .map(|f| f.matches(&e.entity_type))
                    .unwrap_or(true)
            })
            .filter_map(|e| {
                let score = self.score_entity(e, &tokens, &phrase);
                if score > 0.0 {
                    Some(e.to_result(score))
                } else {
                    None
                }
            })
            .collect();

        results.sort_by(crate::types::rank_ordering);
        results.truncate(limit);
        Ok(results)
    }

    async fn get_by_id(&self, entity_id: &str) -> Result<Option<EntityResult>> {
        Ok(self.entities.get(entity_id).map(|e| e.to_result(1.0)))
    }

    async fn get_related(&self, entity_id: &str, max_depth: usize) -> Result<Vec<EntityResult>> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(entity_id);

        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((entity_id, 0));

        let mut related = Vec::new();
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            if let Some(neighbors) = self.edges.get(current) {
                for neighbor in neighbors {
                    if visited.insert(neighbor) {
                        if let Some(entity) = self.entities.get(neighbor) {
                            related.push(entity.to_result(1.0));
                        }
                        queue.push_back((neighbor, depth + 1));
                    }
                }
            }
        }

        related.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(related)
    }
}
