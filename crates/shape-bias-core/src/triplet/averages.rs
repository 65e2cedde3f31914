//! Mean similarity per anchor shape category.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categories::Category;
use crate::error::CoreResult;
use crate::stimulus::Stimulus;
use crate::table::{list_tables, read_rows, write_rows};
use crate::totals::DERIVED_TABLES;

use super::record::SimilarityRecord;

pub const AVERAGES_FILE: &str = "averages.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRow {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Anchor Image Shape")]
    pub anchor_shape: Category,
    #[serde(rename = "Average Dot Shape")]
    pub shape_dot: f64,
    #[serde(rename = "Average Cos Shape")]
    pub shape_cos: f64,
    #[serde(rename = "Average ED Shape")]
    pub shape_ed: f64,
    #[serde(rename = "Average Dot Texture")]
    pub texture_dot: f64,
    #[serde(rename = "Average Cos Texture")]
    pub texture_cos: f64,
    #[serde(rename = "Average ED Texture")]
    pub texture_ed: f64,
}

#[derive(Default)]
struct Sums {
    n: u64,
    values: [f64; 6],
}

/// Average the six measures per anchor shape category.
///
/// Categories with no triplets are omitted rather than divided by zero.
pub fn similarity_averages<'a, I>(model: &str, records: I) -> CoreResult<Vec<AverageRow>>
where
    I: IntoIterator<Item = &'a SimilarityRecord>,
{
    let mut sums: BTreeMap<Category, Sums> = BTreeMap::new();
    for record in records {
        let shape = Stimulus::parse(&record.anchor)?.shape;
        let entry = sums.entry(shape).or_default();
        entry.n += 1;
        for (acc, v) in entry.values.iter_mut().zip([
            record.shape_dot,
            record.shape_cos,
            record.shape_ed,
            record.texture_dot,
            record.texture_cos,
            record.texture_ed,
        ]) {
            *acc += f64::from(v);
        }
    }

    Ok(sums
        .into_iter()
        .map(|(category, s)| {
            let n = s.n as f64;
            AverageRow {
                model: model.to_string(),
                anchor_shape: category,
                shape_dot: s.values[0] / n,
                shape_cos: s.values[1] / n,
                shape_ed: s.values[2] / n,
                texture_dot: s.values[3] / n,
                texture_cos: s.values[4] / n,
                texture_ed: s.values[5] / n,
            }
        })
        .collect())
}

/// Read every per-anchor table in `dir`, average, and write `averages.csv`.
pub fn write_similarity_averages(model: &str, dir: impl AsRef<Path>) -> CoreResult<Vec<AverageRow>> {
    let dir = dir.as_ref();
    let mut records: Vec<SimilarityRecord> = Vec::new();
    for path in list_tables(dir, &DERIVED_TABLES)? {
        records.extend(read_rows::<SimilarityRecord>(&path)?);
    }

    let rows = similarity_averages(model, &records)?;
    write_rows(dir.join(AVERAGES_FILE), &rows)?;
    info!(
        "Averaged {} similarity rows into {} shape categories",
        records.len(),
        rows.len()
    );
    Ok(rows)
}
