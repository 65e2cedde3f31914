//! Run configuration and result directory layout.
//!
//! # TOML Structure
//!
//! ```toml
//! model = "saycam"
//! results_dir = "results"
//! embeddings_dir = "embeddings"
//! cache_policy = "verify_stimuli"
//! verbose = true
//!
//! [null_model]
//! count = 230431
//! seed = 7
//! ```
//!
//! Every field is optional; invalid values are rejected by
//! [`RunConfig::validate`] rather than replaced with defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{CoreResult, ShapeBiasError};

/// How a persisted embedding store is treated when one already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Load the stored embeddings verbatim.
    #[default]
    Reuse,
    /// Recompute when the stored stimulus-set digest differs from the current one.
    VerifyStimuli,
    /// Always recompute and overwrite.
    ForceRecompute,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Reuse => "reuse",
            CachePolicy::VerifyStimuli => "verify_stimuli",
            CachePolicy::ForceRecompute => "force_recompute",
        }
    }
}

fn default_model() -> String {
    "saycam".to_string()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_embeddings_dir() -> PathBuf {
    PathBuf::from("embeddings")
}

fn default_seed() -> u64 {
    0
}

/// Null-model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullModelConfig {
    /// Synthetic triplet count. `None` means "as many as the real run".
    #[serde(default)]
    pub count: Option<usize>,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for NullModelConfig {
    fn default() -> Self {
        Self {
            count: None,
            seed: default_seed(),
        }
    }
}

/// Settings for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model identifier (`saycam`, `resnet50`, ...). Names the result directory.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_embeddings_dir")]
    pub embeddings_dir: PathBuf,

    #[serde(default)]
    pub cache_policy: CachePolicy,

    #[serde(default)]
    pub null_model: NullModelConfig,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            results_dir: default_results_dir(),
            embeddings_dir: default_embeddings_dir(),
            cache_policy: CachePolicy::default(),
            null_model: NullModelConfig::default(),
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    /// - `MissingResource` if the file does not exist
    /// - `InvalidConfig` if the TOML does not parse
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            error!("Failed to read config file {}: {}", path.display(), e);
            ShapeBiasError::io(path, e)
        })?;
        toml::from_str(&contents).map_err(|e| {
            error!("Failed to parse TOML in {}: {}", path.display(), e);
            ShapeBiasError::InvalidConfig(format!("Failed to parse TOML in '{}': {}", path.display(), e))
        })
    }

    /// Reject values that would produce unusable paths or an empty baseline.
    pub fn validate(&self) -> CoreResult<()> {
        if self.model.trim().is_empty() {
            return Err(ShapeBiasError::InvalidConfig("model must not be empty".to_string()));
        }
        if self.model.contains(['/', '\\']) {
            return Err(ShapeBiasError::InvalidConfig(format!(
                "model '{}' must not contain path separators",
                self.model
            )));
        }
        if self.null_model.count == Some(0) {
            return Err(ShapeBiasError::InvalidConfig(
                "[null_model] count must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn layout(&self) -> RunLayout {
        RunLayout::new(&self.results_dir, &self.model)
    }

    /// `<embeddings_dir>/<model>_embeddings.json`
    pub fn embeddings_path(&self) -> PathBuf {
        self.embeddings_dir.join(format!("{}_embeddings.json", self.model))
    }
}

/// Output directories of one model's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    model_dir: PathBuf,
}

impl RunLayout {
    pub fn new(results_dir: impl AsRef<Path>, model: &str) -> Self {
        Self {
            model_dir: results_dir.as_ref().join(model),
        }
    }

    /// `<results>/<model>/`: decision tables, `totals.csv`, `proportions.txt`.
    pub fn decisions_dir(&self) -> &Path {
        &self.model_dir
    }

    /// `<results>/<model>/similarity/`
    pub fn similarity_dir(&self) -> PathBuf {
        self.model_dir.join("similarity")
    }

    /// `<results>/<model>/similarity/null/`
    pub fn null_dir(&self) -> PathBuf {
        self.similarity_dir().join("null")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert_eq!(config.model, "saycam");
        assert_eq!(config.cache_policy, CachePolicy::Reuse);
        assert_eq!(config.embeddings_path(), PathBuf::from("embeddings/saycam_embeddings.json"));
    }

    #[test]
    fn test_layout_paths() {
        let layout = RunLayout::new("out", "resnet50");
        assert_eq!(layout.decisions_dir(), Path::new("out/resnet50"));
        assert_eq!(layout.similarity_dir(), PathBuf::from("out/resnet50/similarity"));
        assert_eq!(layout.null_dir(), PathBuf::from("out/resnet50/similarity/null"));
    }

    #[test]
    fn test_from_file_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "model = \"resnet50\"\ncache_policy = \"verify_stimuli\"\n\n[null_model]\nseed = 7\n",
        )
        .unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.model, "resnet50");
        assert_eq!(config.cache_policy, CachePolicy::VerifyStimuli);
        assert_eq!(config.null_model.seed, 7);
        assert_eq!(config.null_model.count, None);
        assert_eq!(config.results_dir, PathBuf::from("results"));
        println!("[PASS] Partial TOML filled from defaults: {:?}", config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RunConfig {
            model: "a/b".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.model = "saycam".to_string();
        config.null_model.count = Some(0);
        assert!(matches!(config.validate(), Err(ShapeBiasError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "cache_policy = \"sometimes\"\n").unwrap();
        assert!(matches!(RunConfig::from_file(&path), Err(ShapeBiasError::InvalidConfig(_))));
        assert!(matches!(
            RunConfig::from_file(dir.path().join("absent.toml")),
            Err(ShapeBiasError::MissingResource { .. })
        ));
    }
}
