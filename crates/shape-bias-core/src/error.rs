//! Error types for shape-bias-core.
//!
//! All failures are fatal to a run: callers propagate with `?` and the
//! binary aborts with the context carried in each variant. A pairwise cache
//! miss is not an error and never appears here.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::similarity::DenseSimilarityError;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, ShapeBiasError>;

/// Comprehensive error type for decision and similarity pipelines.
#[derive(Debug, Error)]
pub enum ShapeBiasError {
    // ========== Resource Errors ==========
    /// A required file (decision table, similarity table, embeddings) is absent.
    #[error("Missing resource: {path}")]
    MissingResource { path: PathBuf },

    /// A stimulus referenced by a triplet has no embedding.
    #[error("No embedding for stimulus '{stimulus}'")]
    MissingEmbedding { stimulus: String },

    // ========== Aggregation Errors ==========
    /// An aggregation denominator was zero; no valid data reached this stage.
    #[error("Division by zero computing {what} ({context})")]
    Division { what: String, context: String },

    // ========== Input Errors ==========
    /// Stimulus name or category label outside the fixed category set.
    #[error("Malformed input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    /// Same (shape specimen, texture specimen) inserted twice into a decision book.
    #[error("Duplicate stimulus '{0}'")]
    DuplicateStimulus(String),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========== Numeric Errors ==========
    /// Dense similarity primitive rejected its inputs.
    #[error("Similarity error for ({left}, {right}): {source}")]
    Similarity {
        left: String,
        right: String,
        #[source]
        source: DenseSimilarityError,
    },

    /// Softmax produced a non-finite normalizer.
    #[error("Softmax undefined: {0}")]
    Softmax(String),

    // ========== I/O Errors ==========
    /// File system failure with the offending path.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encode/decode failure with the offending path.
    #[error("CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON encode/decode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShapeBiasError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::MissingResource {
                path: path.as_ref().to_path_buf(),
            };
        }
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn division(what: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Division {
            what: what.into(),
            context: context.into(),
        }
    }

    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
