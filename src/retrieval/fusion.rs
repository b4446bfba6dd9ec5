//! Reciprocal Rank Fusion of two ranked lists
//!
//! RRF combines rankings from incomparable scoring spaces (lexical
//! relevance vs. cosine similarity) using rank positions only. Score
//! magnitudes from the input lists never enter the computation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::types::{rank_ordering, EntityResult};

/// RRF dampening constant. 60 keeps rank 1 from dominating rank 2;
/// lower values make the top rank disproportionately powerful.
const RRF_K: f64 = 60.0;

/// RRF contribution of an entry at 0-based rank `r`
fn rrf_score(rank: usize) -> f64 {
    1.0 / (RRF_K + rank as f64 + 1.0)
}

/// Merge two ranked lists via weighted Reciprocal Rank Fusion
///
/// `weight_a` applies to `list_a`, `1 - weight_a` to `list_b`. Entities
/// present in both lists have their weighted contributions summed, so
/// cross-signal agreement outranks single-signal matches at comparable
/// ranks. The combined score is an ordering key valid only within one
/// retrieve call; it is not renormalized into [0, 1].
pub fn fuse(
    list_a: Vec<EntityResult>,
    list_b: Vec<EntityResult>,
    weight_a: f64,
) -> Vec<EntityResult> {
    let weight_a = weight_a.clamp(0.0, 1.0);
    let weight_b = 1.0 - weight_a;

    let mut table: HashMap<String, (EntityResult, f64)> = HashMap::new();

    for (rank, entity) in list_a.into_iter().enumerate() {
        let contribution = rrf_score(rank) * weight_a;
        table.insert(entity.id.clone(), (entity, contribution));
    }

    for (rank, entity) in list_b.into_iter().enumerate() {
        let contribution = rrf_score(rank) * weight_b;
        match table.entry(entity.id.clone()) {
            // Last writer wins for the payload, scores are summed
            Entry::Occupied(mut slot) => {
                let (existing, score) = slot.get_mut();
                *score += contribution;
                *existing = entity;
            }
            Entry::Vacant(slot) => {
                slot.insert((entity, contribution));
            }
        }
    }

    let mut fused: Vec<EntityResult> = table
        .into_values()
        .map(|(mut entity, score)| {
            entity.score = score;
            entity
        })
        .collect();

    fused.sort_by(rank_ordering);
    fused
}
