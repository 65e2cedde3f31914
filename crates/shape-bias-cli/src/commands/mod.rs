//! Subcommand handlers
//!
//! - `decisions`: logits to decision tables, totals and proportions
//! - `triplets`: embeddings to triplet similarity tables and totals
//! - `null_model`: random-vector baseline
//! - `totals`: recompute totals from existing tables

pub mod decisions;
pub mod null_model;
pub mod totals;
pub mod triplets;

use std::path::{Path, PathBuf};

use anyhow::Context;
use shape_bias_core::stimulus::parse_stimuli;
use shape_bias_core::{CachePolicy, RunConfig, Stimulus};
use shape_bias_embeddings::{EmbeddingCache, EmbeddingStore, PrecomputedFeatures};
use tracing::info;

pub use decisions::DecisionsArgs;
pub use null_model::NullModelArgs;
pub use totals::TotalsArgs;
pub use triplets::TripletsArgs;

/// Global flags that override the config file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub results_dir: Option<PathBuf>,
    pub embeddings_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Defaults, then the TOML file if given, then command-line flags.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> anyhow::Result<RunConfig> {
    let mut config = match path {
        Some(path) => RunConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(model) = overrides.model {
        config.model = model;
    }
    if let Some(dir) = overrides.results_dir {
        config.results_dir = dir;
    }
    if let Some(dir) = overrides.embeddings_dir {
        config.embeddings_dir = dir;
    }
    config.verbose |= overrides.verbose;

    config.validate()?;
    Ok(config)
}

/// Parse the stimuli named in a features file and load or compute their
/// embeddings under the configured cache policy.
pub(crate) fn load_embeddings(
    config: &RunConfig,
    features_path: &Path,
    policy: CachePolicy,
) -> anyhow::Result<(Vec<Stimulus>, EmbeddingStore)> {
    let features = PrecomputedFeatures::from_json_file(&config.model, features_path)?;
    let stimuli = parse_stimuli(features.stimulus_names())?;

    let cache = EmbeddingCache::new(&config.embeddings_dir, policy);
    let (store, outcome) = cache.load_or_compute(&stimuli, &features)?;
    info!(
        "{} embeddings for {} stimuli: {:?} ({}, policy {})",
        config.model,
        stimuli.len(),
        outcome,
        cache.path_for(&config.model).display(),
        policy.as_str()
    );
    Ok((stimuli, store))
}
