//! Two-level decision mapping: shape category -> specimen -> record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::categories::Category;
use crate::error::{CoreResult, ShapeBiasError};
use crate::table::{ensure_dir, write_rows};

use super::reducer::DecisionRecord;
use super::row::DecisionRow;

/// (shape specimen, texture specimen), e.g. (`cat4`, `truck3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecimenKey {
    pub shape_spec: String,
    pub texture_spec: String,
}

/// All decision records of a run, grouped by true shape category.
///
/// Records are added once through [`DecisionBook::insert`]; a second record
/// for the same specimen pair is rejected.
#[derive(Debug, Clone, Default)]
pub struct DecisionBook {
    by_shape: BTreeMap<Category, BTreeMap<SpecimenKey, DecisionRecord>>,
}

impl DecisionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: DecisionRecord) -> CoreResult<()> {
        let key = SpecimenKey {
            shape_spec: record.stimulus.shape_spec.clone(),
            texture_spec: record.stimulus.texture_spec.clone(),
        };
        let shelf = self.by_shape.entry(record.stimulus.shape).or_default();
        if shelf.contains_key(&key) {
            error!("Duplicate decision for stimulus {}", record.stimulus.name);
            return Err(ShapeBiasError::DuplicateStimulus(record.stimulus.name.clone()));
        }
        shelf.insert(key, record);
        Ok(())
    }

    /// Records whose true shape is `shape`, ordered by specimen key.
    pub fn records_for(&self, shape: Category) -> impl Iterator<Item = &DecisionRecord> {
        self.by_shape.get(&shape).into_iter().flat_map(|m| m.values())
    }

    pub fn get(&self, shape: Category, key: &SpecimenKey) -> Option<&DecisionRecord> {
        self.by_shape.get(&shape).and_then(|m| m.get(key))
    }

    /// All records, by shape category then specimen key.
    pub fn iter(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.by_shape.values().flat_map(|m| m.values())
    }

    pub fn len(&self) -> usize {
        self.by_shape.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `<shape>.csv` under `dir` for every shape category with records.
    pub fn write_tables(&self, dir: impl AsRef<Path>) -> CoreResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        ensure_dir(dir)?;

        let mut written = Vec::new();
        for (shape, shelf) in &self.by_shape {
            let rows: Vec<DecisionRow> = shelf.values().map(DecisionRow::from).collect();
            let path = dir.join(format!("{}.csv", shape));
            write_rows(&path, &rows)?;
            written.push(path);
        }
        info!(
            "Wrote {} decision tables ({} stimuli) to {}",
            written.len(),
            self.len(),
            dir.display()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CategoryScores, CATEGORY_COUNT};
    use crate::decision::reduce;
    use crate::stimulus::Stimulus;
    use crate::table::read_rows;
    use tempfile::TempDir;

    fn record(name: &str, winner: Category) -> DecisionRecord {
        let mut v = [0.01f32; CATEGORY_COUNT];
        v[winner.index()] = 0.8;
        reduce(&Stimulus::parse(name).unwrap(), CategoryScores::new(&v).unwrap())
    }

    #[test]
    fn test_insert_groups_by_shape() {
        let mut book = DecisionBook::new();
        book.insert(record("cat4-truck3", Category::Cat)).unwrap();
        book.insert(record("cat1-truck3", Category::Truck)).unwrap();
        book.insert(record("dog2-cat1", Category::Dog)).unwrap();

        assert_eq!(book.len(), 3);
        assert_eq!(book.records_for(Category::Cat).count(), 2);
        assert_eq!(book.records_for(Category::Dog).count(), 1);
        assert_eq!(book.records_for(Category::Oven).count(), 0);

        let key = SpecimenKey {
            shape_spec: "cat1".into(),
            texture_spec: "truck3".into(),
        };
        assert_eq!(book.get(Category::Cat, &key).unwrap().decision, Category::Truck);
        println!("[PASS] Same texture specimen under two shape specimens kept apart");
    }

    #[test]
    fn test_duplicate_specimen_rejected() {
        let mut book = DecisionBook::new();
        book.insert(record("cat4-truck3", Category::Cat)).unwrap();
        let err = book.insert(record("cat4-truck3.png", Category::Truck)).unwrap_err();
        assert!(matches!(err, ShapeBiasError::DuplicateStimulus(_)));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_write_tables_one_file_per_shape() {
        let dir = TempDir::new().unwrap();
        let mut book = DecisionBook::new();
        book.insert(record("cat4-truck3", Category::Cat)).unwrap();
        book.insert(record("bear1-clock2", Category::Clock)).unwrap();

        let written = book.write_tables(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("cat.csv").exists());
        assert!(dir.path().join("bear.csv").exists());

        let rows: Vec<DecisionRow> = read_rows(dir.path().join("bear.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shape, Category::Bear);
        assert_eq!(rows[0].texture, "clock2");
        assert_eq!(rows[0].decision, Category::Clock);
        assert_eq!(rows[0].texture_decision, 1);
        assert_eq!(rows[0].shape_decision, 0);
        assert_eq!(rows[0].restricted_texture_decision, 1);
    }
}
