//! Normalized exponential transform.
//!
//! Used three ways: logits to class probabilities, the restricted
//! shape/texture 2-vector, and raw penultimate activations before they are
//! stored as embeddings.

use crate::error::{CoreResult, ShapeBiasError};

/// Numerically stable softmax: `exp(x_i - max) / sum_j exp(x_j - max)`.
///
/// # Errors
///
/// Returns `ShapeBiasError::Softmax` for empty input or when the normalizer
/// is zero or NaN (NaN/Inf in the input).
pub fn softmax(values: &[f32]) -> CoreResult<Vec<f32>> {
    if values.is_empty() {
        return Err(ShapeBiasError::Softmax("empty input".to_string()));
    }

    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp_values: Vec<f32> = values.iter().map(|&x| (x - max).exp()).collect();
    let sum_exp: f32 = exp_values.iter().sum();

    if sum_exp == 0.0 || !sum_exp.is_finite() {
        return Err(ShapeBiasError::Softmax(format!(
            "normalizer is {} - check for NaN/Inf in input",
            sum_exp
        )));
    }

    Ok(exp_values.into_iter().map(|e| e / sum_exp).collect())
}

/// Two-way softmax for the restricted shape/texture decision.
///
/// Always finite for finite inputs, so no error path.
#[inline]
pub fn softmax_pair(a: f32, b: f32) -> [f32; 2] {
    let max = a.max(b);
    let ea = (a - max).exp();
    let eb = (b - max).exp();
    let sum = ea + eb;
    [ea / sum, eb / sum]
}
