//! Tests for dense kernels and the pairwise cache.

use std::cell::Cell;

use super::*;
use crate::error::ShapeBiasError;

#[test]
fn test_l2_norm_3_4_5() {
    assert!((l2_norm(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
}

#[test]
fn test_dot_product_known_value() {
    let dot = dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
    assert!((dot - 32.0).abs() < 1e-6);
}

#[test]
fn test_cosine_orthogonal_and_parallel() {
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-6);
    let parallel = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
    assert!((parallel - 1.0).abs() < 1e-6);
}

#[test]
fn test_euclidean_known_value() {
    let d = euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
    assert!((d - 5.0).abs() < 1e-6);
}

#[test]
fn test_kernel_errors() {
    assert_eq!(dot_product(&[], &[1.0]), Err(DenseSimilarityError::EmptyVector));
    assert_eq!(
        euclidean_distance(&[1.0, 2.0], &[1.0]),
        Err(DenseSimilarityError::DimensionMismatch { expected: 2, actual: 1 })
    );
    assert_eq!(
        cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]),
        Err(DenseSimilarityError::ZeroMagnitude)
    );
}

#[test]
fn test_cosine_and_euclidean_exactly_symmetric() {
    let a = [0.137f32, 0.402, 0.911, 0.003, 0.25];
    let b = [0.5f32, 0.77, 0.011, 0.64, 0.3333];
    assert_eq!(
        cosine_similarity(&a, &b).unwrap().to_bits(),
        cosine_similarity(&b, &a).unwrap().to_bits()
    );
    assert_eq!(
        euclidean_distance(&a, &b).unwrap().to_bits(),
        euclidean_distance(&b, &a).unwrap().to_bits()
    );
    println!("[PASS] cosine and Euclidean bitwise symmetric");
}

#[test]
fn test_rescale_sets_magnitude() {
    let mut v = [0.2f32, 0.4, 0.4];
    assert!(rescale(&mut v, 12.0));
    assert!((l2_norm(&v) - 12.0).abs() < 1e-4);

    let mut zero = [0.0f32; 3];
    assert!(!rescale(&mut zero, 5.0));
}

#[test]
fn test_pair_key_is_order_independent() {
    assert_eq!(PairKey::new("cat4-truck3", "bear1-cat2"), PairKey::new("bear1-cat2", "cat4-truck3"));
    assert_eq!(PairKey::new("b", "a").ids(), ("a", "b"));
}

#[test]
fn test_cache_computes_once_per_unordered_pair() {
    let mut cache = PairwiseCache::new();
    let calls = Cell::new(0u32);
    let compute = || {
        calls.set(calls.get() + 1);
        Ok(PairwiseSimilarity {
            dot: 5.0,
            cosine: 0.5,
            euclidean: 2.0,
        })
    };

    let ab = cache.get_or_insert_with("a", "b", compute).unwrap();
    let ba = cache.get_or_insert_with("b", "a", compute).unwrap();
    let ab_again = cache.get_or_insert_with("a", "b", compute).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(ab, ba);
    assert_eq!(ab, ab_again);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.hits(), 2);
    assert_eq!(cache.misses(), 1);
    assert!((cache.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
    println!("[PASS] (a,b) and (b,a) share one entry; computed {} time(s)", calls.get());
}

#[test]
fn test_cache_get_or_compute_uses_kernels() {
    let mut cache = PairwiseCache::new();
    let a = [1.0f32, 0.0];
    let b = [0.0f32, 1.0];
    let s = cache.get_or_compute("a", &a, "b", &b).unwrap();
    assert!(s.dot.abs() < 1e-6);
    assert!(s.cosine.abs() < 1e-6);
    assert!((s.euclidean - 2.0f32.sqrt()).abs() < 1e-6);
    assert_eq!(cache.get("b", "a"), Some(s));
}

#[test]
fn test_failed_compute_is_not_cached() {
    let mut cache = PairwiseCache::new();
    let err = cache
        .get_or_compute("a", &[1.0, 2.0], "b", &[1.0])
        .unwrap_err();
    assert!(matches!(err, ShapeBiasError::Similarity { .. }));
    assert!(cache.is_empty());
}
