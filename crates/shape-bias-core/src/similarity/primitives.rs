//! Dense vector kernels: L2 norm, dot product, cosine similarity, Euclidean distance.

use super::error::DenseSimilarityError;

/// L2 norm (magnitude) of a vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Rescale `v` in place so its L2 norm equals `magnitude`.
///
/// A zero vector is left untouched and `false` is returned.
#[inline]
pub fn rescale(v: &mut [f32], magnitude: f32) -> bool {
    let norm = l2_norm(v);
    if norm <= f32::EPSILON {
        return false;
    }
    let factor = magnitude / norm;
    for x in v.iter_mut() {
        *x *= factor;
    }
    true
}

#[inline]
fn check_pair(a: &[f32], b: &[f32]) -> Result<(), DenseSimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(DenseSimilarityError::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(DenseSimilarityError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn dot_product_unchecked(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Dot product of two equal-length vectors.
///
/// # Errors
/// - `EmptyVector` if either vector is empty
/// - `DimensionMismatch` if lengths differ
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32, DenseSimilarityError> {
    check_pair(a, b)?;
    Ok(dot_product_unchecked(a, b))
}

/// Cosine similarity (normalized inner product), clamped to [-1.0, 1.0].
///
/// # Errors
/// - `EmptyVector` if either vector is empty
/// - `DimensionMismatch` if lengths differ
/// - `ZeroMagnitude` if either vector has zero norm
///
/// # Example
/// ```rust,ignore
/// let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])?; // 0.0
/// ```
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DenseSimilarityError> {
    check_pair(a, b)?;

    let dot = dot_product_unchecked(a, b);
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return Err(DenseSimilarityError::ZeroMagnitude);
    }

    // Clamp floating point overshoot
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Euclidean distance: L2 norm of `a - b`.
///
/// # Errors
/// - `EmptyVector` if either vector is empty
/// - `DimensionMismatch` if lengths differ
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32, DenseSimilarityError> {
    check_pair(a, b)?;
    Ok(a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt())
}
