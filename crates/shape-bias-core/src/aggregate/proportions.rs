//! Summary proportions from the `total` roll-up row.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{CoreResult, ShapeBiasError};
use crate::table::write_text;

use super::counts::DecisionCounts;
use super::totals::{TotalsTable, TOTALS_FILE};

/// File name of the six-line proportions report.
pub const PROPORTIONS_FILE: &str = "proportions.txt";

/// The six shape/texture proportions of one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proportions {
    /// shape / (shape + texture)
    pub shape_of_cue: f64,
    /// texture / (shape + texture)
    pub texture_of_cue: f64,
    /// shape / total
    pub shape_of_all: f64,
    /// texture / total
    pub texture_of_all: f64,
    /// restricted shape / total
    pub restricted_shape: f64,
    /// restricted texture / total
    pub restricted_texture: f64,
}

impl Proportions {
    /// Compute from overall counts. `model` only appears in error context.
    pub fn from_counts(counts: &DecisionCounts, model: &str) -> CoreResult<Self> {
        let total = counts.total();
        let cue = counts.shape + counts.texture;

        if total == 0 {
            error!("No counted stimuli for model {}; cannot compute proportions", model);
            return Err(ShapeBiasError::division("proportions over total", format!("model {}", model)));
        }
        if cue == 0 {
            error!("No shape or texture decisions for model {}", model);
            return Err(ShapeBiasError::division(
                "proportions over shape+texture",
                format!("model {}", model),
            ));
        }

        let total = total as f64;
        let cue = cue as f64;
        Ok(Self {
            shape_of_cue: counts.shape as f64 / cue,
            texture_of_cue: counts.texture as f64 / cue,
            shape_of_all: counts.shape as f64 / total,
            texture_of_all: counts.texture as f64 / total,
            restricted_shape: counts.restricted_shape as f64 / total,
            restricted_texture: counts.restricted_texture as f64 / total,
        })
    }

    /// Read `totals.csv` from `dir` and compute from its `total` row.
    pub fn from_totals_file(dir: impl AsRef<Path>, model: &str) -> CoreResult<Self> {
        let table = TotalsTable::read(dir.as_ref().join(TOTALS_FILE))?;
        Self::from_counts(&table.overall(), model)
    }

    /// Labeled report lines, in file order.
    pub fn lines(&self) -> [String; 6] {
        [
            format!("Proportion of shape decisions (disregarding 'neither' decisions): {:?}", self.shape_of_cue),
            format!("Proportion of texture decisions (disregarding 'neither' decisions): {:?}", self.texture_of_cue),
            format!("Proportion of shape decisions (including 'neither' decisions): {:?}", self.shape_of_all),
            format!("Proportion of texture decisions (including 'neither' decisions): {:?}", self.texture_of_all),
            format!(
                "Proportion of shape decisions (restricted to only shape/texture classes): {:?}",
                self.restricted_shape
            ),
            format!(
                "Proportion of texture decisions (restricted to only shape/texture classes): {:?}",
                self.restricted_texture
            ),
        ]
    }

    /// Write `proportions.txt` under `dir`; when `verbose`, also log each line.
    pub fn write(&self, dir: impl AsRef<Path>, verbose: bool) -> CoreResult<()> {
        let lines = self.lines();
        if verbose {
            for line in &lines {
                info!("{}", line);
            }
        }
        let mut text = lines.join("\n");
        text.push('\n');
        write_text(dir.as_ref().join(PROPORTIONS_FILE), &text)
    }
}

impl fmt::Display for Proportions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
