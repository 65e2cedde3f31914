//! Triplet similarity engine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{CoreResult, ShapeBiasError};
use crate::similarity::{PairwiseCache, PairwiseSimilarity};
use crate::stimulus::{AnchorTriplets, TripletSet};
use crate::table::{ensure_dir, write_rows};

use super::record::{RowLabels, SimilarityRecord};

/// Read-only access to per-stimulus embedding vectors.
pub trait EmbeddingLookup {
    fn embedding(&self, stimulus: &str) -> Option<&[f32]>;
}

impl EmbeddingLookup for HashMap<String, Vec<f32>> {
    fn embedding(&self, stimulus: &str) -> Option<&[f32]> {
        self.get(stimulus).map(Vec::as_slice)
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripletRunSummary {
    pub anchors: usize,
    pub triplets: usize,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub tables: Vec<PathBuf>,
}

/// Computes shape-leg and texture-leg similarities for every triplet.
///
/// Owns the [`PairwiseCache`] for its lifetime, so a pair shared between
/// anchors (or between the two legs of different triplets) is computed once.
pub struct TripletSimilarityEngine<'e, E: EmbeddingLookup + ?Sized> {
    model: String,
    embeddings: &'e E,
    cache: PairwiseCache,
    verbose: bool,
}

impl<'e, E: EmbeddingLookup + ?Sized> TripletSimilarityEngine<'e, E> {
    pub fn new(model: impl Into<String>, embeddings: &'e E) -> Self {
        Self {
            model: model.into(),
            embeddings,
            cache: PairwiseCache::new(),
            verbose: false,
        }
    }

    /// Log every triplet's six measures at info level, so a single `-v` shows them.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn cache(&self) -> &PairwiseCache {
        &self.cache
    }

    fn vector(&self, stimulus: &str) -> CoreResult<&'e [f32]> {
        let embeddings: &'e E = self.embeddings;
        embeddings.embedding(stimulus).ok_or_else(|| {
            error!("Model {} has no embedding for {}", self.model, stimulus);
            ShapeBiasError::MissingEmbedding {
                stimulus: stimulus.to_string(),
            }
        })
    }

    fn pair(&mut self, a: &str, b: &str) -> CoreResult<PairwiseSimilarity> {
        let a_vec = self.vector(a)?;
        let b_vec = self.vector(b)?;
        self.cache.get_or_compute(a, a_vec, b, b_vec)
    }

    /// Similarity rows for one anchor, in triplet order.
    pub fn anchor_records(&mut self, anchor: &AnchorTriplets) -> CoreResult<Vec<SimilarityRecord>> {
        let mut records = Vec::with_capacity(anchor.triplets.len());
        for triplet in &anchor.triplets {
            let shape = self.pair(&triplet.anchor, &triplet.shape_match)?;
            let texture = self.pair(&triplet.anchor, &triplet.texture_match)?;

            if self.verbose {
                info!(
                    "{} with {}, {}: shape dot={} cos={} ed={} | texture dot={} cos={} ed={}",
                    triplet.anchor,
                    triplet.shape_match,
                    triplet.texture_match,
                    shape.dot,
                    shape.cosine,
                    shape.euclidean,
                    texture.dot,
                    texture.cosine,
                    texture.euclidean
                );
            }

            let labels = RowLabels {
                anchor: &triplet.anchor,
                anchor_shape: &anchor.anchor.shape_spec,
                anchor_texture: &anchor.anchor.texture_spec,
                shape_match: &triplet.shape_match,
                texture_match: &triplet.texture_match,
            };
            records.push(SimilarityRecord::new(&self.model, labels, &shape, &texture));
        }
        Ok(records)
    }

    /// Compute every anchor's rows and write `<anchor>.csv` under `out_dir`.
    pub fn run(&mut self, set: &TripletSet, out_dir: impl AsRef<Path>) -> CoreResult<TripletRunSummary> {
        let out_dir = out_dir.as_ref();
        ensure_dir(out_dir)?;
        info!(
            "Computing similarities for {} triplets over {} anchors (model {})",
            set.len(),
            set.anchors().len(),
            self.model
        );

        let mut tables = Vec::with_capacity(set.anchors().len());
        for anchor in set.anchors() {
            let records = self.anchor_records(anchor)?;
            let path = out_dir.join(format!("{}.csv", anchor.anchor.name));
            write_rows(&path, &records)?;
            tables.push(path);
        }

        let summary = TripletRunSummary {
            anchors: set.anchors().len(),
            triplets: set.len(),
            cache_entries: self.cache.len(),
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            tables,
        };
        info!(
            "Wrote {} anchor tables; pairwise cache: {} entries, hit rate {:.3}",
            summary.anchors,
            summary.cache_entries,
            self.cache.hit_rate()
        );
        Ok(summary)
    }
}
