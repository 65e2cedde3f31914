//! Tests for the triplet engine, closer indicators and averages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use super::*;
use crate::categories::Category;
use crate::error::ShapeBiasError;
use crate::similarity::PairwiseSimilarity;
use crate::stimulus::{enumerate_triplets, parse_stimuli};
use crate::table::read_rows;

fn measures(dot: f32, cosine: f32, euclidean: f32) -> PairwiseSimilarity {
    PairwiseSimilarity {
        dot,
        cosine,
        euclidean,
    }
}

fn labels() -> RowLabels<'static> {
    RowLabels {
        anchor: "cat4-truck3",
        anchor_shape: "cat4",
        anchor_texture: "truck3",
        shape_match: "cat1-bear2",
        texture_match: "dog2-truck1",
    }
}

#[test]
fn test_closer_indicators_dot_vs_euclidean() {
    let shape = measures(5.0, 0.9, 2.0);
    let texture = measures(3.0, 0.4, 1.0);
    let record = SimilarityRecord::new("saycam", labels(), &shape, &texture);

    assert_eq!(record.shape_dot_closer, 1);
    assert_eq!(record.texture_dot_closer, 0);
    assert_eq!(record.shape_cos_closer, 1);
    assert_eq!(record.shape_ed_closer, 0);
    assert_eq!(record.texture_ed_closer, 1);
    println!("[PASS] dot 5 vs 3 -> shape closer; ED 2 vs 1 -> texture closer");
}

#[test]
fn test_closer_ties_go_to_texture() {
    let same = measures(1.0, 0.5, 1.0);
    let c = Closeness::compare(&same, &same);
    assert_eq!(c, Closeness::default());
    let flags = CloserFlags::from(c);
    assert_eq!(
        (flags.texture_dot, flags.texture_cos, flags.texture_ed),
        (1, 1, 1)
    );
}

fn toy_embeddings(names: &[&str]) -> HashMap<String, Vec<f32>> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let x = i as f32 + 1.0;
            (n.to_string(), vec![x, 1.0 / x, 0.5])
        })
        .collect()
}

const NAMES: [&str; 5] = [
    "cat1-truck1",
    "cat2-bear1",
    "dog1-truck2",
    "dog2-bear2",
    "cat3-cat1",
];

#[test]
fn test_engine_writes_one_table_per_anchor() {
    let dir = TempDir::new().unwrap();
    let stimuli = parse_stimuli(NAMES).unwrap();
    let set = enumerate_triplets(&stimuli);
    let embeddings = toy_embeddings(&NAMES);

    let mut engine = TripletSimilarityEngine::new("saycam", &embeddings);
    let summary = engine.run(&set, dir.path()).unwrap();

    assert_eq!(summary.anchors, 4);
    assert_eq!(summary.triplets, 4);
    assert!(dir.path().join("cat1-truck1.csv").exists());
    assert!(!dir.path().join("cat3-cat1.csv").exists());

    let rows: Vec<SimilarityRecord> = read_rows(dir.path().join("cat1-truck1.csv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].anchor_shape, "cat1");
    assert_eq!(rows[0].anchor_texture, "truck1");
    assert_eq!(rows[0].shape_match, "cat2-bear1");
    assert_eq!(rows[0].texture_match, "dog1-truck2");
    assert_eq!(rows[0].shape_dot_closer + rows[0].texture_dot_closer, 1);
    println!("[PASS] Engine summary: {:?}", summary);
}

#[test]
fn test_engine_computes_each_pair_once() {
    let dir = TempDir::new().unwrap();
    let stimuli = parse_stimuli(NAMES).unwrap();
    let set = enumerate_triplets(&stimuli);
    let embeddings = toy_embeddings(&NAMES);

    let mut engine = TripletSimilarityEngine::new("saycam", &embeddings);
    let summary = engine.run(&set, dir.path()).unwrap();

    // 4 triplets x 2 legs; cat1-truck1/cat2-bear1 is reused as the reverse
    // shape leg of cat2-bear1's triplet, and so on.
    assert_eq!(summary.cache_hits + summary.cache_misses, 8);
    assert_eq!(summary.cache_misses as usize, summary.cache_entries);
    assert!(summary.cache_hits > 0);
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run the engine under an `info` filter, the level a single `-v` installs.
fn info_log_of_run(verbose: bool) -> String {
    let dir = TempDir::new().unwrap();
    let stimuli = parse_stimuli(NAMES).unwrap();
    let set = enumerate_triplets(&stimuli);
    let embeddings = toy_embeddings(&NAMES);

    let log = CapturedLog::default();
    let sink = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let mut engine = TripletSimilarityEngine::new("saycam", &embeddings).with_verbose(verbose);
        engine.run(&set, dir.path()).unwrap();
    });

    let bytes = log.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_verbose_triplet_detail_visible_at_info() {
    let text = info_log_of_run(true);
    assert!(text.contains("cat1-truck1 with cat2-bear1, dog1-truck2: shape dot="));
    assert!(!info_log_of_run(false).contains("shape dot="));
    println!("[PASS] Per-triplet measures logged at info when verbose");
}

#[test]
fn test_missing_embedding_names_stimulus() {
    let dir = TempDir::new().unwrap();
    let stimuli = parse_stimuli(NAMES).unwrap();
    let set = enumerate_triplets(&stimuli);
    let mut embeddings = toy_embeddings(&NAMES);
    embeddings.remove("dog2-bear2");

    let mut engine = TripletSimilarityEngine::new("saycam", &embeddings);
    let err = engine.run(&set, dir.path()).unwrap_err();
    match err {
        ShapeBiasError::MissingEmbedding { stimulus } => assert_eq!(stimulus, "dog2-bear2"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_averages_group_by_anchor_shape_and_skip_empty() {
    let a = SimilarityRecord::new("saycam", labels(), &measures(4.0, 0.8, 1.0), &measures(2.0, 0.2, 3.0));
    let b = SimilarityRecord::new("saycam", labels(), &measures(2.0, 0.4, 3.0), &measures(4.0, 0.6, 1.0));
    let rows = similarity_averages("saycam", [&a, &b]).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].anchor_shape, Category::Cat);
    assert!((rows[0].shape_dot - 3.0).abs() < 1e-9);
    assert!((rows[0].shape_cos - 0.6).abs() < 1e-6);
    assert!((rows[0].texture_ed - 2.0).abs() < 1e-9);
}

#[test]
fn test_write_averages_ignores_derived_tables() {
    let dir = TempDir::new().unwrap();
    let stimuli = parse_stimuli(NAMES).unwrap();
    let set = enumerate_triplets(&stimuli);
    let embeddings = toy_embeddings(&NAMES);
    TripletSimilarityEngine::new("saycam", &embeddings)
        .run(&set, dir.path())
        .unwrap();

    let first = write_similarity_averages("saycam", dir.path()).unwrap();
    // A second pass must not read averages.csv back in as anchor rows.
    let second = write_similarity_averages("saycam", dir.path()).unwrap();
    assert_eq!(first, second);
    let categories: Vec<Category> = first.iter().map(|r| r.anchor_shape).collect();
    assert_eq!(categories, vec![Category::Cat, Category::Dog]);
}
