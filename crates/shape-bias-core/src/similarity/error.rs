//! Failures of the dot, cosine and Euclidean kernels.

use thiserror::Error;

/// Why a pair of embedding vectors could not be compared.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DenseSimilarityError {
    /// Left and right vectors disagree on length.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector with no coordinates.
    #[error("Empty vector provided")]
    EmptyVector,

    /// An all-zero vector, for which cosine has no value.
    #[error("Zero magnitude vector - cosine undefined")]
    ZeroMagnitude,
}
