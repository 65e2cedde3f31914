//! Null-model baseline: random triplets with real-embedding magnitudes.
//!
//! Directions are uniform in the positive orthant; magnitudes follow a
//! normal distribution fitted to the observed embedding norms. Comparing the
//! resulting closer proportions with a real model's shows how much of its
//! shape/texture preference is explained by magnitude alone.

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, error, info, warn};

use crate::error::{CoreResult, ShapeBiasError};
use crate::similarity::{l2_norm, rescale, PairwiseSimilarity};
use crate::table::{ensure_dir, write_rows};
use crate::totals::{write_similarity_proportions, SimilarityProportions};
use crate::triplet::{RowLabels, SimilarityRecord};

pub const NULL_FILE: &str = "null.csv";

/// Magnitude summary of a model's embeddings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub dimension: usize,
}

impl MagnitudeStats {
    /// Mean, min and max L2 norm over `vectors`, which must share one length.
    pub fn from_vectors<'a, I>(vectors: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut count = 0usize;
        let mut sum = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = 0.0f32;
        let mut dimension = None;

        for v in vectors {
            match dimension {
                None => dimension = Some(v.len()),
                Some(d) if d != v.len() => {
                    error!("Embedding dimension mismatch: {} vs {}", d, v.len());
                    return Err(ShapeBiasError::malformed(
                        "embeddings",
                        format!("mixed dimensions {} and {}", d, v.len()),
                    ));
                }
                Some(_) => {}
            }
            let mag = l2_norm(v);
            sum += f64::from(mag);
            min = min.min(mag);
            max = max.max(mag);
            count += 1;
        }

        let dimension = match dimension {
            Some(d) if d > 0 => d,
            _ => {
                error!("Cannot derive magnitude statistics from empty embeddings");
                return Err(ShapeBiasError::InvalidConfig(
                    "no non-empty embeddings to derive magnitude statistics from".to_string(),
                ));
            }
        };

        Ok(Self {
            mean: (sum / count as f64) as f32,
            min,
            max,
            dimension,
        })
    }

    /// Half the distance from the mean to the nearer extreme.
    pub fn std_dev(&self) -> f32 {
        (self.mean - self.min).min(self.max - self.mean) / 2.0
    }
}

/// Draws synthetic triplets from a seeded generator.
pub struct NullModel {
    stats: MagnitudeStats,
    magnitude: Normal<f32>,
    rng: ChaCha8Rng,
}

impl NullModel {
    pub fn new(stats: MagnitudeStats, seed: u64) -> CoreResult<Self> {
        if !stats.mean.is_finite() || stats.mean <= 0.0 {
            error!("Null model needs a positive mean magnitude, got {}", stats.mean);
            return Err(ShapeBiasError::InvalidConfig(format!(
                "mean magnitude must be positive, got {}",
                stats.mean
            )));
        }
        let sd = stats.std_dev().max(0.0);
        let magnitude = Normal::new(stats.mean, sd).map_err(|e| {
            error!("Invalid magnitude distribution N({}, {}): {}", stats.mean, sd, e);
            ShapeBiasError::InvalidConfig(format!("magnitude distribution: {}", e))
        })?;
        debug!("Null model magnitudes ~ N({}, {})", stats.mean, sd);

        Ok(Self {
            stats,
            magnitude,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn stats(&self) -> &MagnitudeStats {
        &self.stats
    }

    /// A strictly positive magnitude; non-positive draws are redrawn.
    pub fn sample_magnitude(&mut self) -> f32 {
        loop {
            let m = self.magnitude.sample(&mut self.rng);
            if m > 0.0 {
                return m;
            }
        }
    }

    /// One vector with uniform [0, 1) coordinates rescaled to a sampled magnitude.
    pub fn sample_vector(&mut self) -> Vec<f32> {
        loop {
            let mut v: Vec<f32> = (0..self.stats.dimension).map(|_| self.rng.gen::<f32>()).collect();
            let magnitude = self.sample_magnitude();
            if rescale(&mut v, magnitude) {
                return v;
            }
        }
    }

    /// Generate `count` synthetic triplets as similarity rows.
    pub fn generate(&mut self, model: &str, count: usize) -> CoreResult<Vec<SimilarityRecord>> {
        let mut rows = Vec::with_capacity(count);
        for t in 0..count {
            let anchor = self.sample_vector();
            let shape_match = self.sample_vector();
            let texture_match = self.sample_vector();

            let anchor_id = format!("null-{}", t);
            let shape_id = format!("null-{}-shape", t);
            let texture_id = format!("null-{}-texture", t);
            let shape = PairwiseSimilarity::compute(&anchor_id, &anchor, &shape_id, &shape_match)?;
            let texture = PairwiseSimilarity::compute(&anchor_id, &anchor, &texture_id, &texture_match)?;

            let labels = RowLabels {
                anchor: &anchor_id,
                anchor_shape: "",
                anchor_texture: "",
                shape_match: &shape_id,
                texture_match: &texture_id,
            };
            rows.push(SimilarityRecord::new(model, labels, &shape, &texture));
        }
        Ok(rows)
    }
}

/// Generate the baseline, write `null.csv` into `null_dir`, then its proportions.
pub fn run_null_model(
    model: &str,
    stats: MagnitudeStats,
    count: usize,
    seed: u64,
    null_dir: impl AsRef<Path>,
) -> CoreResult<(PathBuf, SimilarityProportions)> {
    let null_dir = null_dir.as_ref();
    if count == 0 {
        warn!("Null model requested with zero triplets");
    }
    info!(
        "Generating {} null triplets for {} (dim {}, magnitude mean {:.4}, min {:.4}, max {:.4})",
        count, model, stats.dimension, stats.mean, stats.min, stats.max
    );

    let mut generator = NullModel::new(stats, seed)?;
    let rows = generator.generate(model, count)?;

    ensure_dir(null_dir)?;
    let path = null_dir.join(NULL_FILE);
    write_rows(&path, &rows)?;
    let proportions = write_similarity_proportions(model, null_dir)?;
    Ok((path, proportions))
}
