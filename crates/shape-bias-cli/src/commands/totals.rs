//! `totals`: recompute summaries from tables already on disk.

use clap::Args;
use shape_bias_core::aggregate::{aggregate_tables, Proportions};
use shape_bias_core::totals::{write_agreement_matrix, write_similarity_proportions};
use shape_bias_core::triplet::write_similarity_averages;
use shape_bias_core::RunConfig;

#[derive(Args, Debug)]
pub struct TotalsArgs {
    /// Also write the dot/cosine agreement matrix
    #[arg(long)]
    pub matrix: bool,

    /// Use the null-model directory instead of the similarity directory
    #[arg(long)]
    pub null: bool,

    /// Also re-aggregate the decision tables into totals and proportions
    #[arg(long, conflicts_with = "null")]
    pub decisions: bool,
}

pub fn execute(config: &RunConfig, args: TotalsArgs) -> anyhow::Result<()> {
    let layout = config.layout();

    if args.decisions {
        let dir = layout.decisions_dir();
        let totals = aggregate_tables(dir)?;
        totals.write(dir)?;
        let proportions = Proportions::from_counts(&totals.overall(), &config.model)?;
        proportions.write(dir, config.verbose)?;
        for line in proportions.lines() {
            println!("{}", line);
        }
    }

    let dir = if args.null {
        layout.null_dir()
    } else {
        layout.similarity_dir()
    };
    let p = write_similarity_proportions(&config.model, &dir)?;
    println!(
        "{}: shape closer dot {:.4}, cos {:.4}, ED {:.4}",
        config.model, p.shape_dot, p.shape_cos, p.shape_ed
    );

    if args.matrix {
        let m = write_agreement_matrix(&config.model, &dir)?;
        println!(
            "Cos shape: dot shape {}, dot texture {}; cos texture: dot shape {}, dot texture {}",
            m.shape_shape, m.cos_shape_dot_texture, m.cos_texture_dot_shape, m.texture_texture
        );
    }
    if !args.null {
        write_similarity_averages(&config.model, &dir)?;
    }
    println!("Results in {}", dir.display());
    Ok(())
}
