//! Anchor / shape-match / texture-match similarity.
//!
//! Each triplet yields dot, cosine and Euclidean measures for both legs and
//! an indicator of which leg is closer under each measure. Rows are written
//! one table per anchor.

mod averages;
mod engine;
mod record;

#[cfg(test)]
mod tests;

pub use averages::{similarity_averages, write_similarity_averages, AverageRow, AVERAGES_FILE};
pub use engine::{EmbeddingLookup, TripletRunSummary, TripletSimilarityEngine};
pub use record::{CloserFlags, Closeness, RowLabels, SimilarityRecord};
