//! Shape Bias Embeddings
//!
//! Penultimate-layer embeddings for cue-conflict stimuli: the extractor
//! contract, a per-model JSON store, and a load-or-compute cache whose
//! freshness is governed by an explicit [`CachePolicy`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shape_bias_core::{CachePolicy, stimulus::parse_stimuli};
//! use shape_bias_embeddings::{EmbeddingCache, PrecomputedFeatures};
//!
//! let features = PrecomputedFeatures::from_json_file("saycam", "features/saycam.json")?;
//! let stimuli = parse_stimuli(features.stimulus_names())?;
//! let cache = EmbeddingCache::new("embeddings", CachePolicy::VerifyStimuli);
//! let (store, outcome) = cache.load_or_compute(&stimuli, &features)?;
//! ```

pub mod cache;
pub mod error;
pub mod extractor;
pub mod store;


pub use cache::{compute_store, CacheOutcome, EmbeddingCache};
pub use error::{EmbeddingError, EmbeddingResult};
pub use extractor::{FeatureExtractor, PrecomputedFeatures};
pub use shape_bias_core::CachePolicy;
pub use store::{digest_of, stimulus_digest, EmbeddingStore};
