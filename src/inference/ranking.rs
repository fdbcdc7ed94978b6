//! Arg-max and top-k over a probability vector
//!
//! Ordering is deterministic: higher probability first, equal probabilities
//! by ascending class index, NaN below every number. `argmax` and the head of
//! `top_k` therefore always agree.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::labels::class_name;

/// One entry of a ranked prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub index: usize,
    pub label: String,
    pub probability: f32,
}

fn rank_key(p: f32) -> f32 {
    if p.is_nan() {
        f32::NEG_INFINITY
    } else {
        p
    }
}

/// Descending by probability, ascending by index on ties
fn compare(a: (usize, f32), b: (usize, f32)) -> Ordering {
    rank_key(b.1)
        .total_cmp(&rank_key(a.1))
        .then_with(|| a.0.cmp(&b.0))
}

/// Index of the highest probability, lowest index on ties. `None` when empty.
pub fn argmax(probabilities: &[f32]) -> Option<usize> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .min_by(|&a, &b| compare(a, b))
        .map(|(idx, _)| idx)
}

/// The `k` most probable classes, best first
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<RankedClass> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|&a, &b| compare(a, b));

    indexed
        .into_iter()
        .take(k)
        .map(|(index, probability)| RankedClass {
            index,
            label: class_name(index)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unknown_{}", index)),
            probability,
        })
        .collect()
}
