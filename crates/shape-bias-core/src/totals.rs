//! Similarity totals: closer-indicator proportions and the dot/cosine agreement matrix.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{CoreResult, ShapeBiasError};
use crate::table::{list_tables, read_rows, write_rows};
use crate::triplet::CloserFlags;

pub const SIMILARITY_PROPORTIONS_FILE: &str = "proportions.csv";
pub const MATRIX_FILE: &str = "matrix.csv";

/// Tables in a similarity directory that are outputs, not per-anchor rows.
pub const DERIVED_TABLES: [&str; 3] = ["averages.csv", SIMILARITY_PROPORTIONS_FILE, MATRIX_FILE];

/// Share of rows where each leg is closer, per measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityProportions {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Shape Dot Closer")]
    pub shape_dot: f64,
    #[serde(rename = "Shape Cos Closer")]
    pub shape_cos: f64,
    #[serde(rename = "Texture Dot Closer")]
    pub texture_dot: f64,
    #[serde(rename = "Texture Cos Closer")]
    pub texture_cos: f64,
    #[serde(rename = "Shape ED Closer")]
    pub shape_ed: f64,
    #[serde(rename = "Texture ED Closer")]
    pub texture_ed: f64,
}

/// 2x2 agreement between the dot-product and cosine verdicts.
///
/// Rows are the cosine verdict, columns the dot verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementMatrix {
    /// Shape by dot and by cosine.
    pub shape_shape: u64,
    /// Shape by cosine, texture by dot.
    pub cos_shape_dot_texture: u64,
    /// Texture by cosine, shape by dot.
    pub cos_texture_dot_shape: u64,
    /// Texture by dot and by cosine.
    pub texture_texture: u64,
}

impl AgreementMatrix {
    /// Add one row. Rows whose flags match no branch are dropped.
    pub fn tally(&mut self, f: &CloserFlags) {
        if f.shape_dot == 1 {
            if f.shape_cos == 1 {
                self.shape_shape += 1;
            } else if f.texture_cos == 1 {
                self.cos_texture_dot_shape += 1;
            }
        } else if f.texture_dot == 1 {
            if f.shape_cos == 1 {
                self.cos_shape_dot_texture += 1;
            } else if f.texture_cos == 1 {
                self.texture_texture += 1;
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.shape_shape + self.cos_shape_dot_texture + self.cos_texture_dot_shape + self.texture_texture
    }

    pub fn rows(&self, model: &str) -> [MatrixRow; 2] {
        [
            MatrixRow {
                model: model.to_string(),
                label: "Shape Match with Cosine Similarity".to_string(),
                dot_shape: self.shape_shape,
                dot_texture: self.cos_shape_dot_texture,
            },
            MatrixRow {
                model: model.to_string(),
                label: "Texture Match with Cosine Similarity".to_string(),
                dot_shape: self.cos_texture_dot_shape,
                dot_texture: self.texture_texture,
            },
        ]
    }
}

/// One row of `matrix.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = " ")]
    pub label: String,
    #[serde(rename = "Shape Match with Dot Product")]
    pub dot_shape: u64,
    #[serde(rename = "Texture Match with Dot Product")]
    pub dot_texture: u64,
}

fn read_flags(dir: &Path) -> CoreResult<Vec<CloserFlags>> {
    let mut flags = Vec::new();
    for path in list_tables(dir, &DERIVED_TABLES)? {
        flags.extend(read_rows::<CloserFlags>(&path)?);
    }
    Ok(flags)
}

/// Proportions over a set of rows. Zero rows is a division error.
pub fn proportions_of(model: &str, flags: &[CloserFlags]) -> CoreResult<SimilarityProportions> {
    if flags.is_empty() {
        error!("No similarity rows for model {}", model);
        return Err(ShapeBiasError::division(
            "closer proportions over similarity rows",
            format!("model {}", model),
        ));
    }

    let mut sums = [0u64; 6];
    for f in flags {
        sums[0] += u64::from(f.shape_dot);
        sums[1] += u64::from(f.shape_cos);
        sums[2] += u64::from(f.shape_ed);
        sums[3] += u64::from(f.texture_dot);
        sums[4] += u64::from(f.texture_cos);
        sums[5] += u64::from(f.texture_ed);
    }
    let n = flags.len() as f64;
    Ok(SimilarityProportions {
        model: model.to_string(),
        shape_dot: sums[0] as f64 / n,
        shape_cos: sums[1] as f64 / n,
        shape_ed: sums[2] as f64 / n,
        texture_dot: sums[3] as f64 / n,
        texture_cos: sums[4] as f64 / n,
        texture_ed: sums[5] as f64 / n,
    })
}

/// Read the per-anchor tables under `dir` and write `proportions.csv`.
pub fn write_similarity_proportions(model: &str, dir: impl AsRef<Path>) -> CoreResult<SimilarityProportions> {
    let dir = dir.as_ref();
    let flags = read_flags(dir)?;
    let proportions = proportions_of(model, &flags)?;
    write_rows(dir.join(SIMILARITY_PROPORTIONS_FILE), std::slice::from_ref(&proportions))?;
    info!(
        "{}: shape closer by dot {:.4}, cos {:.4}, ED {:.4} over {} rows",
        model,
        proportions.shape_dot,
        proportions.shape_cos,
        proportions.shape_ed,
        flags.len()
    );
    Ok(proportions)
}

/// Read the per-anchor tables under `dir` and write `matrix.csv`.
pub fn write_agreement_matrix(model: &str, dir: impl AsRef<Path>) -> CoreResult<AgreementMatrix> {
    let dir = dir.as_ref();
    let mut matrix = AgreementMatrix::default();
    for f in read_flags(dir)? {
        matrix.tally(&f);
    }
    write_rows(dir.join(MATRIX_FILE), &matrix.rows(model))?;
    info!("{}: agreement matrix {:?}", model, matrix);
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn flags(shape_dot: bool, shape_cos: bool) -> CloserFlags {
        CloserFlags {
            shape_dot: shape_dot as u8,
            shape_cos: shape_cos as u8,
            shape_ed: 1,
            texture_dot: !shape_dot as u8,
            texture_cos: !shape_cos as u8,
            texture_ed: 0,
        }
    }

    #[test]
    fn test_proportions_over_rows() {
        let rows = vec![flags(true, true), flags(true, false), flags(false, false), flags(true, true)];
        let p = proportions_of("saycam", &rows).unwrap();
        assert!((p.shape_dot - 0.75).abs() < 1e-12);
        assert!((p.shape_cos - 0.5).abs() < 1e-12);
        assert!((p.texture_dot - 0.25).abs() < 1e-12);
        assert!((p.shape_ed - 1.0).abs() < 1e-12);
        println!("[PASS] Proportions: {:?}", p);
    }

    #[test]
    fn test_zero_rows_is_division_error() {
        let err = proportions_of("saycam", &[]).unwrap_err();
        assert!(matches!(err, ShapeBiasError::Division { .. }));
    }

    #[test]
    fn test_matrix_branches() {
        let mut m = AgreementMatrix::default();
        m.tally(&flags(true, true));
        m.tally(&flags(true, false));
        m.tally(&flags(false, true));
        m.tally(&flags(false, false));
        m.tally(&flags(false, false));
        assert_eq!(m.shape_shape, 1);
        assert_eq!(m.cos_texture_dot_shape, 1);
        assert_eq!(m.cos_shape_dot_texture, 1);
        assert_eq!(m.texture_texture, 2);
        assert_eq!(m.total(), 5);
    }

    #[test]
    fn test_matrix_drops_rows_matching_no_branch() {
        let mut m = AgreementMatrix::default();
        m.tally(&CloserFlags::default());
        m.tally(&CloserFlags {
            shape_dot: 1,
            ..Default::default()
        });
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn test_write_files_skip_derived_tables() {
        let dir = TempDir::new().unwrap();
        let header = "Model,Anchor,Shape Dot Closer,Shape Cos Closer,Shape ED Closer,\
Texture Dot Closer,Texture Cos Closer,Texture ED Closer\n";
        std::fs::write(
            dir.path().join("cat1-truck1.csv"),
            format!("{header}saycam,cat1-truck1,1,1,0,0,0,1\nsaycam,cat1-truck1,0,1,0,1,0,1\n"),
        )
        .unwrap();

        let p = write_similarity_proportions("saycam", dir.path()).unwrap();
        let m = write_agreement_matrix("saycam", dir.path()).unwrap();
        // Re-running must not count proportions.csv or matrix.csv as rows.
        let again = write_similarity_proportions("saycam", dir.path()).unwrap();
        assert_eq!(p, again);
        assert!((p.shape_dot - 0.5).abs() < 1e-12);
        assert_eq!(m.shape_shape, 1);
        assert_eq!(m.cos_shape_dot_texture, 1);

        let rows: Vec<MatrixRow> = read_rows(dir.path().join(MATRIX_FILE)).unwrap();
        assert_eq!(rows[0].label, "Shape Match with Cosine Similarity");
        assert_eq!(rows[1].dot_texture, 0);
    }
}
