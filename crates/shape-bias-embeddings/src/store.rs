//! Per-model embedding store and its JSON file format.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shape_bias_core::{EmbeddingLookup, ShapeBiasError, Stimulus};
use tracing::{debug, error};

use crate::error::{EmbeddingError, EmbeddingResult};

/// SHA-256 (hex) of the sorted, newline-joined stimulus names.
pub fn stimulus_digest<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = names.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut hasher = Sha256::new();
    for name in sorted {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Digest of a stimulus set, by name.
pub fn digest_of(stimuli: &[Stimulus]) -> String {
    stimulus_digest(stimuli.iter().map(|s| s.name.as_str()))
}

/// Post-softmax embeddings of one model, keyed by stimulus name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingStore {
    pub model: String,
    pub dimension: usize,
    /// Digest of the stimulus set the store was computed for.
    pub stimulus_digest: String,
    pub embeddings: BTreeMap<String, Vec<f32>>,
}

/// On-disk forms: the current self-describing form, or a bare
/// `{stimulus: vector}` map as older result directories hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredForm {
    Store(EmbeddingStore),
    Bare(BTreeMap<String, Vec<f32>>),
}

impl EmbeddingStore {
    pub fn new(model: impl Into<String>, dimension: usize, embeddings: BTreeMap<String, Vec<f32>>) -> Self {
        let stimulus_digest = stimulus_digest(embeddings.keys().map(String::as_str));
        Self {
            model: model.into(),
            dimension,
            stimulus_digest,
            embeddings,
        }
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn get(&self, stimulus: &str) -> Option<&[f32]> {
        self.embeddings.get(stimulus).map(Vec::as_slice)
    }

    /// Every vector, in stimulus-name order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.embeddings.values().map(Vec::as_slice)
    }

    /// Whether the store was computed for exactly this stimulus set.
    pub fn matches_stimuli(&self, stimuli: &[Stimulus]) -> bool {
        self.stimulus_digest == digest_of(stimuli)
    }

    /// Check every vector has `dimension` finite values.
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.dimension == 0 {
            return Err(EmbeddingError::EmptyInput);
        }
        for (name, vector) in &self.embeddings {
            if vector.len() != self.dimension {
                error!(
                    "Stored embedding for {} has {} values, expected {}",
                    name,
                    vector.len(),
                    self.dimension
                );
                return Err(EmbeddingError::InvalidDimension {
                    stimulus: name.clone(),
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
            if let Some((index, &value)) = vector.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                error!("Stored embedding for {} has {} at index {}", name, value, index);
                return Err(EmbeddingError::InvalidValue {
                    stimulus: name.clone(),
                    index,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Write the store as JSON via a temp file renamed over `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> EmbeddingResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create {}: {}", parent.display(), e);
                EmbeddingError::CacheError {
                    path: parent.to_path_buf(),
                    message: format!("Failed to create directory: {}", e),
                }
            })?;
        }

        let data = serde_json::to_vec(self).map_err(|e| {
            error!("Embedding store serialization failed: {}", e);
            EmbeddingError::SerializationError {
                message: format!("JSON serialization failed: {}", e),
            }
        })?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &data).map_err(|e| {
            error!("Embedding store write failed for {}: {}", temp_path.display(), e);
            EmbeddingError::CacheError {
                path: temp_path.clone(),
                message: format!("Failed to write store file: {}", e),
            }
        })?;
        fs::rename(&temp_path, path).map_err(|e| {
            error!("Embedding store rename failed for {}: {}", path.display(), e);
            EmbeddingError::CacheError {
                path: path.to_path_buf(),
                message: format!("Failed to rename temp store file: {}", e),
            }
        })?;

        debug!("Saved {} embeddings ({} bytes) to {}", self.len(), data.len(), path.display());
        Ok(())
    }

    /// Read and validate a store. A bare map is accepted for `model`.
    pub fn load(path: impl AsRef<Path>, model: &str) -> EmbeddingResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            error!("Embedding store read failed for {}: {}", path.display(), e);
            EmbeddingError::CacheError {
                path: path.to_path_buf(),
                message: format!("Failed to read store file: {}", e),
            }
        })?;

        let form: StoredForm = serde_json::from_slice(&data).map_err(|e| {
            error!("Embedding store parse failed for {}: {}", path.display(), e);
            EmbeddingError::SerializationError {
                message: format!("store JSON in '{}': {}", path.display(), e),
            }
        })?;

        let store = match form {
            StoredForm::Store(store) => store,
            StoredForm::Bare(raw) => {
                let embeddings = normalize_keys(raw)?;
                let dimension = embeddings.values().next().map(Vec::len).unwrap_or(0);
                Self::new(model, dimension, embeddings)
            }
        };
        store.validate()?;
        Ok(store)
    }
}

/// Key a bare map by stimulus name; older files key by image file name.
fn normalize_keys(raw: BTreeMap<String, Vec<f32>>) -> EmbeddingResult<BTreeMap<String, Vec<f32>>> {
    let mut embeddings = BTreeMap::new();
    for (key, vector) in raw {
        let name = Stimulus::parse(&key)?.name;
        if embeddings.insert(name.clone(), vector).is_some() {
            error!("Stored embeddings hold '{}' under more than one key", name);
            return Err(ShapeBiasError::DuplicateStimulus(name).into());
        }
    }
    Ok(embeddings)
}

impl EmbeddingLookup for EmbeddingStore {
    fn embedding(&self, stimulus: &str) -> Option<&[f32]> {
        self.get(stimulus)
    }
}
