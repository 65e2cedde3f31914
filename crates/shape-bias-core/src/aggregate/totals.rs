//! Per-category roll-up.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::categories::Category;
use crate::decision::{DecisionRecord, DecisionRow};
use crate::error::{CoreResult, ShapeBiasError};
use crate::table::{list_tables, read_rows, write_rows};

use super::counts::DecisionCounts;

/// File name of the roll-up table inside a model's result directory.
pub const TOTALS_FILE: &str = "totals.csv";

const TOTAL_LABEL: &str = "total";

/// Counts for all 16 shape categories plus their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsTable {
    by_category: BTreeMap<Category, DecisionCounts>,
    overall: DecisionCounts,
}

impl TotalsTable {
    /// Build from per-category counts; categories absent from `by_category` count as zero.
    pub fn from_counts(mut by_category: BTreeMap<Category, DecisionCounts>) -> Self {
        let mut overall = DecisionCounts::default();
        for category in Category::ALL {
            let counts = by_category.entry(category).or_default();
            overall.merge(counts);
        }
        Self {
            by_category,
            overall,
        }
    }

    pub fn category(&self, category: Category) -> DecisionCounts {
        self.by_category.get(&category).copied().unwrap_or_default()
    }

    /// Sum across all categories.
    pub fn overall(&self) -> DecisionCounts {
        self.overall
    }

    /// 16 category rows in category order, then the `total` row.
    pub fn rows(&self) -> Vec<TotalsRow> {
        let mut rows: Vec<TotalsRow> = Category::ALL
            .iter()
            .map(|&c| TotalsRow::new(c.name(), &self.category(c)))
            .collect();
        rows.push(TotalsRow::new(TOTAL_LABEL, &self.overall));
        rows
    }

    pub fn write(&self, dir: impl AsRef<Path>) -> CoreResult<()> {
        write_rows(dir.as_ref().join(TOTALS_FILE), &self.rows())
    }

    /// Read a `totals.csv`. The `total` row must be present.
    pub fn read(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let rows: Vec<TotalsRow> = read_rows(path)?;

        let mut by_category = BTreeMap::new();
        let mut overall = None;
        for row in rows {
            if row.shape_category == TOTAL_LABEL {
                overall = Some(row.counts());
            } else {
                by_category.insert(row.shape_category.parse::<Category>()?, row.counts());
            }
        }
        let overall = overall.ok_or_else(|| {
            ShapeBiasError::malformed(path.display().to_string(), "totals table has no 'total' row")
        })?;

        Ok(Self {
            by_category,
            overall,
        })
    }

    /// Per-category and overall counts at info level.
    pub fn log_summary(&self) {
        for category in Category::ALL {
            let c = self.category(category);
            info!(
                "Shape category {}: shape={} texture={} neither={} | restricted shape={} texture={}",
                category, c.shape, c.texture, c.neither, c.restricted_shape, c.restricted_texture
            );
        }
        let o = self.overall;
        info!(
            "IN TOTAL: shape={} texture={} neither={} | restricted shape={} texture={}",
            o.shape, o.texture, o.neither, o.restricted_shape, o.restricted_texture
        );
    }
}

/// One row of `totals.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsRow {
    #[serde(rename = "Shape Category")]
    pub shape_category: String,
    #[serde(rename = "Number Shape Decisions")]
    pub shape: u64,
    #[serde(rename = "Number Texture Decisions")]
    pub texture: u64,
    #[serde(rename = "Number Neither")]
    pub neither: u64,
    #[serde(rename = "Number Restricted Shape Decisions")]
    pub restricted_shape: u64,
    #[serde(rename = "Number Restricted Texture Decisions")]
    pub restricted_texture: u64,
    #[serde(rename = "Total Number Stimuli")]
    pub total: u64,
}

impl TotalsRow {
    fn new(label: &str, c: &DecisionCounts) -> Self {
        Self {
            shape_category: label.to_string(),
            shape: c.shape,
            texture: c.texture,
            neither: c.neither,
            restricted_shape: c.restricted_shape,
            restricted_texture: c.restricted_texture,
            total: c.total(),
        }
    }

    fn counts(&self) -> DecisionCounts {
        DecisionCounts {
            shape: self.shape,
            texture: self.texture,
            neither: self.neither,
            restricted_shape: self.restricted_shape,
            restricted_texture: self.restricted_texture,
        }
    }
}

/// Roll up in-memory decision records by their true shape category.
pub fn aggregate_records<'a, I>(records: I) -> TotalsTable
where
    I: IntoIterator<Item = &'a DecisionRecord>,
{
    let mut by_category: BTreeMap<Category, DecisionCounts> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in records {
        if !by_category
            .entry(record.stimulus.shape)
            .or_default()
            .tally_record(record)
        {
            skipped += 1;
        }
    }
    debug!("Aggregation filter skipped {} records", skipped);
    TotalsTable::from_counts(by_category)
}

/// Roll up every per-shape decision table in `dir` (all `*.csv` except `totals.csv`).
pub fn aggregate_tables(dir: impl AsRef<Path>) -> CoreResult<TotalsTable> {
    let dir = dir.as_ref();
    let mut by_category: BTreeMap<Category, DecisionCounts> = BTreeMap::new();

    for path in list_tables(dir, &[TOTALS_FILE])? {
        let rows: Vec<DecisionRow> = read_rows(&path)?;
        debug!("Aggregating {} rows from {}", rows.len(), path.display());
        for row in &rows {
            by_category.entry(row.shape).or_default().tally_row(row);
        }
    }

    Ok(TotalsTable::from_counts(by_category))
}
