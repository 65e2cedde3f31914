//! Feature extractor contract and a precomputed-features implementation.

use std::collections::BTreeMap;
use std::path::Path;

use shape_bias_core::Stimulus;
use tracing::{error, info};

use crate::error::{EmbeddingError, EmbeddingResult};

/// Produces a penultimate-layer activation vector for a stimulus.
///
/// Implementations run inference only and must return `dimension()` values.
pub trait FeatureExtractor {
    /// Model identifier, e.g. `saycam` or `resnet50`.
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Raw activations (before softmax) for one stimulus.
    fn extract(&self, stimulus: &Stimulus) -> EmbeddingResult<Vec<f32>>;
}

/// Activations computed elsewhere and saved as JSON: `{"cat4-truck3": [..], ...}`.
///
/// Keys may carry an image extension; lookups use the stimulus name without it.
#[derive(Debug, Clone)]
pub struct PrecomputedFeatures {
    model: String,
    dimension: usize,
    features: BTreeMap<String, Vec<f32>>,
}

impl PrecomputedFeatures {
    /// Build from an in-memory map. All vectors must share one non-zero length.
    pub fn new(model: impl Into<String>, raw: BTreeMap<String, Vec<f32>>) -> EmbeddingResult<Self> {
        let mut features = BTreeMap::new();
        let mut dimension = None;
        for (key, vector) in raw {
            let name = Stimulus::parse(&key)?.name;
            match dimension {
                None if vector.is_empty() => return Err(EmbeddingError::EmptyInput),
                None => dimension = Some(vector.len()),
                Some(d) if d != vector.len() => {
                    error!("Feature length mismatch for {}: {} vs {}", name, vector.len(), d);
                    return Err(EmbeddingError::InvalidDimension {
                        stimulus: name,
                        expected: d,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
            }
            features.insert(name, vector);
        }

        let dimension = dimension.ok_or(EmbeddingError::EmptyInput)?;
        Ok(Self {
            model: model.into(),
            dimension,
            features,
        })
    }

    pub fn from_json_file(model: impl Into<String>, path: impl AsRef<Path>) -> EmbeddingResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            error!("Failed to read features {}: {}", path.display(), e);
            EmbeddingError::CacheError {
                path: path.to_path_buf(),
                message: format!("Failed to read features file: {}", e),
            }
        })?;
        let raw: BTreeMap<String, Vec<f32>> = serde_json::from_str(&contents).map_err(|e| {
            error!("Failed to parse features {}: {}", path.display(), e);
            EmbeddingError::SerializationError {
                message: format!("features JSON in '{}': {}", path.display(), e),
            }
        })?;
        let features = Self::new(model, raw)?;
        info!(
            "Loaded {} feature vectors (dim {}) from {}",
            features.len(),
            features.dimension,
            path.display()
        );
        Ok(features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Names of every stimulus with features, sorted.
    pub fn stimulus_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }
}

impl FeatureExtractor for PrecomputedFeatures {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn extract(&self, stimulus: &Stimulus) -> EmbeddingResult<Vec<f32>> {
        self.features
            .get(&stimulus.name)
            .cloned()
            .ok_or_else(|| EmbeddingError::MissingFeatures {
                stimulus: stimulus.name.clone(),
            })
    }
}
