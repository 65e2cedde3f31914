//! Dense similarity kernels and the run-scoped pairwise cache.

mod cache;
mod error;
mod primitives;

#[cfg(test)]
mod tests;

pub use cache::{PairKey, PairwiseCache, PairwiseSimilarity};
pub use error::DenseSimilarityError;
pub use primitives::{cosine_similarity, dot_product, euclidean_distance, l2_norm, rescale};
