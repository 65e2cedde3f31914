//! Error types for embedding extraction and caching.

use std::path::PathBuf;

use shape_bias_core::ShapeBiasError;
use thiserror::Error;

/// Result type alias for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Failures while extracting, validating or persisting embeddings.
///
/// A missing store file is not an error: it means "compute".
#[derive(Debug, Error)]
pub enum EmbeddingError {
    // === Extraction Errors ===
    /// The feature source has nothing for this stimulus.
    #[error("No features for stimulus '{stimulus}'")]
    MissingFeatures { stimulus: String },

    /// The extractor failed on one stimulus.
    #[error("Extraction failed for '{stimulus}': {message}")]
    ExtractionFailed { stimulus: String, message: String },

    #[error("Empty input not allowed")]
    EmptyInput,

    // === Validation Errors ===
    /// Vector length differs from the model's dimension.
    #[error("Invalid dimension for '{stimulus}': expected {expected}, got {actual}")]
    InvalidDimension {
        stimulus: String,
        expected: usize,
        actual: usize,
    },

    /// NaN or Infinity at a specific index.
    #[error("Invalid embedding value for '{stimulus}' at index {index}: {value}")]
    InvalidValue {
        stimulus: String,
        index: usize,
        value: f32,
    },

    // === Infrastructure Errors ===
    /// Store file could not be read, written or renamed.
    #[error("Cache error at {path}: {message}")]
    CacheError { path: PathBuf, message: String },

    /// JSON encode/decode failed.
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Propagated from `shape-bias-core` (softmax, stimulus parsing).
    #[error(transparent)]
    Core(#[from] ShapeBiasError),
}
