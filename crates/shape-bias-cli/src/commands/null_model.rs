//! `null-model`: random-vector baseline for one model.

use std::path::PathBuf;

use clap::Args;
use shape_bias_core::null_model::{run_null_model, MagnitudeStats};
use shape_bias_core::stimulus::enumerate_triplets;
use shape_bias_core::RunConfig;
use tracing::info;

use super::load_embeddings;

#[derive(Args, Debug)]
pub struct NullModelArgs {
    /// Features file of the model whose magnitudes the baseline matches
    #[arg(long)]
    pub features: PathBuf,

    /// Synthetic triplet count [default: the model's real triplet count]
    #[arg(long)]
    pub count: Option<usize>,

    /// RNG seed [default: from config, else 0]
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(config: &RunConfig, args: NullModelArgs) -> anyhow::Result<()> {
    let (stimuli, store) = load_embeddings(config, &args.features, config.cache_policy)?;
    let stats = MagnitudeStats::from_vectors(store.vectors())?;

    let count = match args.count.or(config.null_model.count) {
        Some(0) => anyhow::bail!("--count must be positive"),
        Some(n) => n,
        None => {
            let n = enumerate_triplets(&stimuli).len();
            info!("Matching the real run's {} triplets", n);
            n
        }
    };
    let seed = args.seed.unwrap_or(config.null_model.seed);

    let null_dir = config.layout().null_dir();
    let (path, p) = run_null_model(&config.model, stats, count, seed, &null_dir)?;
    println!("{}: {} null triplets (seed {}) in {}", config.model, count, seed, path.display());
    println!(
        "Shape closer: dot {:.4}, cos {:.4}, ED {:.4}",
        p.shape_dot, p.shape_cos, p.shape_ed
    );
    Ok(())
}
