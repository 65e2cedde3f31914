//! `triplets`: embeddings to triplet similarity tables.

use std::path::PathBuf;

use clap::Args;
use shape_bias_core::pipeline::run_similarity;
use shape_bias_core::{CachePolicy, RunConfig};

use super::load_embeddings;

#[derive(Args, Debug)]
pub struct TripletsArgs {
    /// JSON object of stimulus file name to raw penultimate-layer activations
    #[arg(long)]
    pub features: PathBuf,

    /// Recompute embeddings even if a stored file exists
    #[arg(long, conflicts_with = "verify_stimuli")]
    pub force_recompute: bool,

    /// Recompute embeddings only if the stored stimulus set differs
    #[arg(long)]
    pub verify_stimuli: bool,
}

impl TripletsArgs {
    /// Flag-selected policy, else the configured one.
    pub fn policy(&self, configured: CachePolicy) -> CachePolicy {
        if self.force_recompute {
            CachePolicy::ForceRecompute
        } else if self.verify_stimuli {
            CachePolicy::VerifyStimuli
        } else {
            configured
        }
    }
}

pub fn execute(config: &RunConfig, args: TripletsArgs) -> anyhow::Result<()> {
    let policy = args.policy(config.cache_policy);
    let (stimuli, store) = load_embeddings(config, &args.features, policy)?;

    let sim_dir = config.layout().similarity_dir();
    let summary = run_similarity(&config.model, &stimuli, &store, &sim_dir, config.verbose)?;

    let p = &summary.proportions;
    println!(
        "{}: {} triplets over {} anchors ({} pairs cached, {} hits)",
        config.model, summary.run.triplets, summary.run.anchors, summary.run.cache_entries, summary.run.cache_hits
    );
    println!(
        "Shape closer: dot {:.4}, cos {:.4}, ED {:.4}",
        p.shape_dot, p.shape_cos, p.shape_ed
    );
    println!(
        "Texture closer: dot {:.4}, cos {:.4}, ED {:.4}",
        p.texture_dot, p.texture_cos, p.texture_ed
    );
    println!("Results in {}", sim_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(force_recompute: bool, verify_stimuli: bool) -> TripletsArgs {
        TripletsArgs {
            features: PathBuf::from("features.json"),
            force_recompute,
            verify_stimuli,
        }
    }

    #[test]
    fn test_flags_select_policy() {
        assert_eq!(args(true, false).policy(CachePolicy::Reuse), CachePolicy::ForceRecompute);
        assert_eq!(args(false, true).policy(CachePolicy::Reuse), CachePolicy::VerifyStimuli);
        assert_eq!(args(false, false).policy(CachePolicy::VerifyStimuli), CachePolicy::VerifyStimuli);
    }
}
