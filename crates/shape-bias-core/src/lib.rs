//! Shape Bias Core Library
//!
//! Measures whether an image classifier decides by object shape or by
//! surface texture, using cue-conflict stimuli whose shape and texture come
//! from different categories (`cat4-truck3`: cat shape, truck texture).
//!
//! # Architecture
//!
//! Two pipelines share this crate:
//! - Decisions: logits -> `softmax` -> [`CategoryMapping`] -> [`decision::reduce`]
//!   -> [`DecisionBook`] -> [`aggregate`] totals and proportions
//! - Similarity: [`stimulus::enumerate_triplets`] -> [`TripletSimilarityEngine`]
//!   (backed by [`PairwiseCache`]) -> [`totals`] proportions and matrix, plus a
//!   [`null_model`] baseline
//!
//! Embedding extraction and caching live in `shape-bias-embeddings`.
//!
//! # Example
//!
//! ```
//! use shape_bias_core::categories::{Category, CategoryScores, CATEGORY_COUNT};
//! use shape_bias_core::decision::reduce;
//! use shape_bias_core::stimulus::Stimulus;
//!
//! let stimulus = Stimulus::parse("cat4-truck3.png").unwrap();
//! let mut scores = [0.0f32; CATEGORY_COUNT];
//! scores[Category::Cat.index()] = 0.7;
//! scores[Category::Truck.index()] = 0.2;
//!
//! let record = reduce(&stimulus, CategoryScores::new(&scores).unwrap());
//! assert_eq!(record.decision, Category::Cat);
//! assert_eq!(record.restricted_decision, Category::Cat);
//! ```

pub mod aggregate;
pub mod categories;
pub mod config;
pub mod decision;
pub mod error;
pub mod null_model;
pub mod pipeline;
pub mod similarity;
pub mod softmax;
pub mod stimulus;
pub mod table;
pub mod totals;
pub mod triplet;

pub use categories::{Category, CategoryMapping, CategoryScores, IndexGroupMapping};
pub use config::{CachePolicy, RunConfig, RunLayout};
pub use decision::{DecisionBook, DecisionRecord};
pub use error::{CoreResult, ShapeBiasError};
pub use similarity::{PairwiseCache, PairwiseSimilarity};
pub use stimulus::{Stimulus, Triplet, TripletSet};
pub use triplet::{EmbeddingLookup, SimilarityRecord, TripletSimilarityEngine};
