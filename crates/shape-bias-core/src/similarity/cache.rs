//! Memoized pairwise similarity keyed by unordered stimulus pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{CoreResult, ShapeBiasError};

use super::primitives::{cosine_similarity, dot_product, euclidean_distance};

/// Unordered pair of stimulus ids, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn ids(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}

/// The three measures for one pair of embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairwiseSimilarity {
    pub dot: f32,
    pub cosine: f32,
    pub euclidean: f32,
}

impl PairwiseSimilarity {
    /// Compute all three measures; `left`/`right` name the vectors in errors.
    pub fn compute(left: &str, a: &[f32], right: &str, b: &[f32]) -> CoreResult<Self> {
        let wrap = |source| {
            error!("Similarity failed for ({}, {}): {}", left, right, source);
            ShapeBiasError::Similarity {
                left: left.to_string(),
                right: right.to_string(),
                source,
            }
        };
        Ok(Self {
            dot: dot_product(a, b).map_err(wrap)?,
            cosine: cosine_similarity(a, b).map_err(wrap)?,
            euclidean: euclidean_distance(a, b).map_err(wrap)?,
        })
    }
}

/// Cache of [`PairwiseSimilarity`] for the duration of one run.
///
/// At most one entry exists per unordered pair, and entries are never
/// invalidated, so `(a, b)` and `(b, a)` always return the same value.
#[derive(Debug, Default)]
pub struct PairwiseCache {
    entries: HashMap<PairKey, PairwiseSimilarity>,
    hits: u64,
    misses: u64,
}

impl PairwiseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for the pair, if any. Does not touch the counters.
    pub fn get(&self, a: &str, b: &str) -> Option<PairwiseSimilarity> {
        self.entries.get(&PairKey::new(a, b)).copied()
    }

    /// Return the cached entry, or run `compute` once and cache its result.
    ///
    /// A failed computation caches nothing.
    pub fn get_or_insert_with<F>(&mut self, a: &str, b: &str, compute: F) -> CoreResult<PairwiseSimilarity>
    where
        F: FnOnce() -> CoreResult<PairwiseSimilarity>,
    {
        let key = PairKey::new(a, b);
        if let Some(found) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*found);
        }
        self.misses += 1;
        let value = compute()?;
        debug!("Cached similarity for ({}, {})", a, b);
        self.entries.insert(key, value);
        Ok(value)
    }

    /// [`get_or_insert_with`](Self::get_or_insert_with) using the dense kernels.
    pub fn get_or_compute(
        &mut self,
        a: &str,
        a_vec: &[f32],
        b: &str,
        b_vec: &[f32],
    ) -> CoreResult<PairwiseSimilarity> {
        self.get_or_insert_with(a, b, || PairwiseSimilarity::compute(a, a_vec, b, b_vec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that ran the similarity function.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fraction of lookups served from the cache, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
