//! Shape Bias CLI
//!
//! Runs the decision and similarity pipelines for one model and writes their
//! tables under `<results>/<model>/`.
//!
//! # Usage
//!
//! ```bash
//! shape-bias -m saycam decisions --logits logits.json --category-map imagenet16.json
//! shape-bias -m saycam triplets --features features.json --verify-stimuli
//! shape-bias -m saycam null-model --features features.json --seed 7
//! shape-bias -m saycam totals --matrix --null
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Run failed
//! - 2: Invalid input

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;

use commands::{ConfigOverrides, DecisionsArgs, NullModelArgs, TotalsArgs, TripletsArgs};
use error::{exit_code_for_error, CliExitCode};

/// Shape/texture bias evaluation on cue-conflict stimuli
#[derive(Parser)]
#[command(name = "shape-bias")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Model identifier; names the result directory
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// TOML run configuration. Command-line flags take precedence.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the per-model result directories
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Directory holding `<model>_embeddings.json`
    #[arg(long, global = true)]
    embeddings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify stimuli from logits; write decision tables, totals and proportions
    Decisions(DecisionsArgs),
    /// Compute triplet similarities from embeddings; write per-anchor tables and totals
    Triplets(TripletsArgs),
    /// Generate a random-vector baseline matched to the model's embedding magnitudes
    NullModel(NullModelArgs),
    /// Recompute totals from tables already on disk
    Totals(TotalsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("CLI started with verbosity level {}", cli.verbose);

    match run(cli) {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e).into()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        model: cli.model,
        results_dir: cli.results_dir,
        embeddings_dir: cli.embeddings_dir,
        verbose: cli.verbose > 0,
    };
    let config = commands::resolve_config(cli.config.as_deref(), overrides)?;
    debug!("Resolved run config: {:?}", config);

    match cli.command {
        Commands::Decisions(args) => commands::decisions::execute(&config, args),
        Commands::Triplets(args) => commands::triplets::execute(&config, args),
        Commands::NullModel(args) => commands::null_model::execute(&config, args),
        Commands::Totals(args) => commands::totals::execute(&config, args),
    }
}
