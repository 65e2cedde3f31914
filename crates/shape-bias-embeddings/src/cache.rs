//! Load-or-compute embedding cache with an explicit freshness policy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shape_bias_core::softmax::softmax;
use shape_bias_core::{CachePolicy, Stimulus};
use tracing::{error, info, warn};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::extractor::FeatureExtractor;
use crate::store::EmbeddingStore;

/// Where the store came from on this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Loaded from disk.
    Loaded,
    /// No store on disk; extracted and saved.
    Computed,
    /// A store existed but the policy required recomputation.
    Recomputed,
}

/// Persists one embedding store per model under a directory.
///
/// # File Layout
///
/// `<dir>/<model>_embeddings.json`, written whole via temp file + rename.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    dir: PathBuf,
    policy: CachePolicy,
}

impl EmbeddingCache {
    pub fn new(dir: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn path_for(&self, model: &str) -> PathBuf {
        self.dir.join(format!("{}_embeddings.json", model))
    }

    /// Return the stored embeddings for the extractor's model, computing and
    /// saving them first when the policy or a missing file requires it.
    pub fn load_or_compute<X: FeatureExtractor + ?Sized>(
        &self,
        stimuli: &[Stimulus],
        extractor: &X,
    ) -> EmbeddingResult<(EmbeddingStore, CacheOutcome)> {
        let model = extractor.model_id();
        let path = self.path_for(model);

        if path.exists() {
            match self.policy {
                CachePolicy::Reuse => {
                    let store = EmbeddingStore::load(&path, model)?;
                    info!("Reusing {} stored embeddings from {}", store.len(), path.display());
                    return Ok((store, CacheOutcome::Loaded));
                }
                CachePolicy::VerifyStimuli => {
                    let store = EmbeddingStore::load(&path, model)?;
                    if store.matches_stimuli(stimuli) {
                        info!("Stored embeddings match current stimuli ({})", store.stimulus_digest);
                        return Ok((store, CacheOutcome::Loaded));
                    }
                    warn!(
                        "Stimulus set changed since {} was written ({} stored); recomputing",
                        path.display(),
                        store.len()
                    );
                }
                CachePolicy::ForceRecompute => {
                    warn!("Forced recomputation; overwriting {}", path.display());
                }
            }
            let store = compute_store(stimuli, extractor)?;
            store.save(&path)?;
            return Ok((store, CacheOutcome::Recomputed));
        }

        info!("No stored embeddings at {}; extracting", path.display());
        let store = compute_store(stimuli, extractor)?;
        store.save(&path)?;
        Ok((store, CacheOutcome::Computed))
    }

    /// Load without computing. Absent file is a `CacheError`.
    pub fn load(&self, model: &str) -> EmbeddingResult<EmbeddingStore> {
        EmbeddingStore::load(self.path_for(model), model)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Extract every stimulus once, apply softmax, and build a store.
pub fn compute_store<X: FeatureExtractor + ?Sized>(
    stimuli: &[Stimulus],
    extractor: &X,
) -> EmbeddingResult<EmbeddingStore> {
    let dimension = extractor.dimension();
    let mut embeddings = BTreeMap::new();

    for stimulus in stimuli {
        if embeddings.contains_key(&stimulus.name) {
            continue;
        }
        let raw = extractor.extract(stimulus)?;
        if raw.len() != dimension {
            error!(
                "{} returned {} values for {}, expected {}",
                extractor.model_id(),
                raw.len(),
                stimulus.name,
                dimension
            );
            return Err(EmbeddingError::InvalidDimension {
                stimulus: stimulus.name.clone(),
                expected: dimension,
                actual: raw.len(),
            });
        }
        embeddings.insert(stimulus.name.clone(), softmax(&raw)?);
    }

    let store = EmbeddingStore::new(extractor.model_id(), dimension, embeddings);
    info!("Extracted {} embeddings (dim {}) for {}", store.len(), dimension, store.model);
    Ok(store)
}
