//! End-to-end runs for one model: decisions and triplet similarity.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::aggregate::{aggregate_records, Proportions, TotalsTable};
use crate::categories::CategoryMapping;
use crate::decision::{classify, DecisionBook};
use crate::error::CoreResult;
use crate::stimulus::{enumerate_triplets, Stimulus};
use crate::table::ensure_dir;
use crate::totals::{write_agreement_matrix, write_similarity_proportions, AgreementMatrix, SimilarityProportions};
use crate::triplet::{write_similarity_averages, AverageRow, EmbeddingLookup, TripletRunSummary, TripletSimilarityEngine};

/// Everything the decision run produced.
#[derive(Debug)]
pub struct DecisionSummary {
    pub book: DecisionBook,
    pub totals: TotalsTable,
    pub proportions: Proportions,
}

/// Classify every stimulus, then write per-shape tables, `totals.csv` and
/// `proportions.txt` under `out_dir`.
///
/// `logits` maps stimulus names (with or without extension) to raw logits.
pub fn run_decisions<M: CategoryMapping + ?Sized>(
    model: &str,
    logits: &BTreeMap<String, Vec<f32>>,
    mapping: &M,
    out_dir: impl AsRef<Path>,
    verbose: bool,
) -> CoreResult<DecisionSummary> {
    let out_dir = out_dir.as_ref();
    info!("Classifying {} stimuli for model {}", logits.len(), model);

    let mut book = DecisionBook::new();
    for (name, values) in logits {
        let stimulus = Stimulus::parse(name)?;
        book.insert(classify(&stimulus, values, mapping)?)?;
    }

    book.write_tables(out_dir)?;
    let totals = aggregate_records(book.iter());
    totals.write(out_dir)?;
    if verbose {
        totals.log_summary();
    }

    let proportions = Proportions::from_counts(&totals.overall(), model)?;
    proportions.write(out_dir, verbose)?;

    Ok(DecisionSummary {
        book,
        totals,
        proportions,
    })
}

/// Everything the similarity run produced.
#[derive(Debug)]
pub struct SimilaritySummary {
    pub run: TripletRunSummary,
    pub proportions: SimilarityProportions,
    pub matrix: AgreementMatrix,
    pub averages: Vec<AverageRow>,
}

/// Enumerate triplets, compute per-anchor tables, then proportions, the
/// agreement matrix and per-category averages, all under `sim_dir`.
pub fn run_similarity<E: EmbeddingLookup + ?Sized>(
    model: &str,
    stimuli: &[Stimulus],
    embeddings: &E,
    sim_dir: impl AsRef<Path>,
    verbose: bool,
) -> CoreResult<SimilaritySummary> {
    let sim_dir = sim_dir.as_ref();
    ensure_dir(sim_dir)?;

    let set = enumerate_triplets(stimuli);
    if set.is_empty() {
        warn!("No valid triplets among {} stimuli", stimuli.len());
    }

    let mut engine = TripletSimilarityEngine::new(model, embeddings).with_verbose(verbose);
    let run = engine.run(&set, sim_dir)?;

    let proportions = write_similarity_proportions(model, sim_dir)?;
    let matrix = write_agreement_matrix(model, sim_dir)?;
    let averages = write_similarity_averages(model, sim_dir)?;

    Ok(SimilaritySummary {
        run,
        proportions,
        matrix,
        averages,
    })
}
