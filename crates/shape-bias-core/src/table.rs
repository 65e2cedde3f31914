//! CSV table persistence.
//!
//! Every output table is regenerated in full from memory and written to a
//! temp file that is renamed over the target, so readers never observe a
//! half-written table.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{CoreResult, ShapeBiasError};

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: impl AsRef<Path>) -> CoreResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| {
        error!("Failed to create directory {}: {}", dir.display(), e);
        ShapeBiasError::io(dir, e)
    })
}

/// Write `rows` as a headed CSV table, replacing any existing file.
pub fn write_rows<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> CoreResult<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("csv.tmp");

    {
        let mut writer = csv::Writer::from_path(&temp_path).map_err(|e| {
            error!("CSV open failed for {}: {}", temp_path.display(), e);
            ShapeBiasError::csv(&temp_path, e)
        })?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| ShapeBiasError::csv(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| ShapeBiasError::io(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        error!("Rename {} -> {} failed: {}", temp_path.display(), path.display(), e);
        ShapeBiasError::io(path, e)
    })?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a headed CSV table into typed rows.
pub fn read_rows<T: DeserializeOwned>(path: impl AsRef<Path>) -> CoreResult<Vec<T>> {
    let path = path.as_ref();
    if !path.exists() {
        error!("Table not found: {}", path.display());
        return Err(ShapeBiasError::MissingResource {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| ShapeBiasError::csv(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| {
            error!("CSV decode failed for {}: {}", path.display(), e);
            ShapeBiasError::csv(path, e)
        })
}

/// Write plain text, replacing any existing file.
pub fn write_text(path: impl AsRef<Path>, contents: &str) -> CoreResult<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(|e| ShapeBiasError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| ShapeBiasError::io(path, e))
}

/// `*.csv` files directly under `dir`, excluding the named derived tables, sorted by name.
pub fn list_tables(dir: impl AsRef<Path>, exclude: &[&str]) -> CoreResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| {
        error!("Cannot list tables in {}: {}", dir.display(), e);
        ShapeBiasError::io(dir, e)
    })?;

    let mut tables = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ShapeBiasError::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let excluded = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| exclude.contains(&n))
            .unwrap_or(false);
        if !excluded {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Value")]
        value: f64,
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![
            Row { name: "a".into(), value: 1.5 },
            Row { name: "b".into(), value: -2.0 },
        ];
        write_rows(&path, &rows).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Name,Value"));
        assert!(!path.with_extension("csv.tmp").exists());

        let back: Vec<Row> = read_rows(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_read_missing_table_is_missing_resource() {
        let dir = TempDir::new().unwrap();
        let err = read_rows::<Row>(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, ShapeBiasError::MissingResource { .. }));
    }

    #[test]
    fn test_list_tables_skips_excluded_and_non_csv() {
        let dir = TempDir::new().unwrap();
        for name in ["cat.csv", "dog.csv", "totals.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let tables = list_tables(dir.path(), &["totals.csv"]).unwrap();
        let names: Vec<_> = tables
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cat.csv", "dog.csv"]);
    }
}
