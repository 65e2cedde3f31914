//! `decisions`: logits file to decision tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use shape_bias_core::pipeline::run_decisions;
use shape_bias_core::{IndexGroupMapping, RunConfig, ShapeBiasError};
use tracing::error;

#[derive(Args, Debug)]
pub struct DecisionsArgs {
    /// JSON object of stimulus file name to raw logits
    #[arg(long)]
    pub logits: PathBuf,

    /// JSON object of category name to model class indices
    #[arg(long)]
    pub category_map: PathBuf,
}

/// Read a `{stimulus: [logit, ...]}` file.
pub fn read_logits(path: &Path) -> Result<BTreeMap<String, Vec<f32>>, ShapeBiasError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        error!("Failed to read logits {}: {}", path.display(), e);
        ShapeBiasError::io(path, e)
    })?;
    let logits: BTreeMap<String, Vec<f32>> = serde_json::from_str(&raw)?;
    if logits.is_empty() {
        return Err(ShapeBiasError::malformed(path.display().to_string(), "logits file names no stimuli"));
    }
    Ok(logits)
}

pub fn execute(config: &RunConfig, args: DecisionsArgs) -> anyhow::Result<()> {
    let logits = read_logits(&args.logits).with_context(|| format!("reading logits {}", args.logits.display()))?;
    let width = logits.values().next().map(Vec::len).unwrap_or(0);
    let mapping = IndexGroupMapping::from_json_file(&args.category_map, width)
        .with_context(|| format!("loading category map {}", args.category_map.display()))?;

    let layout = config.layout();
    let summary = run_decisions(&config.model, &logits, &mapping, layout.decisions_dir(), config.verbose)?;

    let overall = summary.totals.overall();
    println!(
        "{}: {} stimuli, counted {} (shape {}, texture {}, neither {})",
        config.model,
        summary.book.len(),
        overall.total(),
        overall.shape,
        overall.texture,
        overall.neither
    );
    for line in summary.proportions.lines() {
        println!("{}", line);
    }
    println!("Results in {}", layout.decisions_dir().display());
    Ok(())
}
