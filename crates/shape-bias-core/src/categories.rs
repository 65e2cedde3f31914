//! The 16-category decision space and the mapping onto it.
//!
//! Classifier outputs live in a 1000-way ImageNet space. Decisions are made
//! in a reduced space of 16 coarse categories, in a fixed order that every
//! [`CategoryScores`] vector is index-aligned to.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{CoreResult, ShapeBiasError};

/// Number of coarse decision categories.
pub const CATEGORY_COUNT: usize = 16;

/// One of the 16 coarse object categories of the cue-conflict stimulus set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Airplane,
    Bear,
    Bicycle,
    Bird,
    Boat,
    Bottle,
    Car,
    Cat,
    Chair,
    Clock,
    Dog,
    Elephant,
    Keyboard,
    Knife,
    Oven,
    Truck,
}

impl Category {
    /// All categories in decision-space order.
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Airplane,
        Category::Bear,
        Category::Bicycle,
        Category::Bird,
        Category::Boat,
        Category::Bottle,
        Category::Car,
        Category::Cat,
        Category::Chair,
        Category::Clock,
        Category::Dog,
        Category::Elephant,
        Category::Keyboard,
        Category::Knife,
        Category::Oven,
        Category::Truck,
    ];

    /// Position of this category in every score vector.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category at `index`, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Airplane => "airplane",
            Category::Bear => "bear",
            Category::Bicycle => "bicycle",
            Category::Bird => "bird",
            Category::Boat => "boat",
            Category::Bottle => "bottle",
            Category::Car => "car",
            Category::Cat => "cat",
            Category::Chair => "chair",
            Category::Clock => "clock",
            Category::Dog => "dog",
            Category::Elephant => "elephant",
            Category::Keyboard => "keyboard",
            Category::Knife => "knife",
            Category::Oven => "oven",
            Category::Truck => "truck",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ShapeBiasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| ShapeBiasError::malformed(s, "not one of the 16 decision categories"))
    }
}

/// Averaged probabilities for the 16 categories, index-aligned to [`Category::ALL`].
///
/// Values are finite and non-negative; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores([f32; CATEGORY_COUNT]);

impl CategoryScores {
    /// Build from a slice, validating length, finiteness and sign.
    pub fn new(values: &[f32]) -> CoreResult<Self> {
        if values.len() != CATEGORY_COUNT {
            return Err(ShapeBiasError::malformed(
                format!("score vector of length {}", values.len()),
                format!("expected exactly {} category scores", CATEGORY_COUNT),
            ));
        }
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ShapeBiasError::malformed(
                format!("score {} for {}", v, Category::ALL[i]),
                "category scores must be finite and non-negative",
            ));
        }
        let mut scores = [0.0f32; CATEGORY_COUNT];
        scores.copy_from_slice(values);
        Ok(Self(scores))
    }

    #[inline]
    pub fn get(&self, category: Category) -> f32 {
        self.0[category.index()]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Category with the highest score; ties resolve to the earliest category.
    pub fn argmax(&self) -> Category {
        let mut best = 0;
        for (i, &v) in self.0.iter().enumerate().skip(1) {
            if v > self.0[best] {
                best = i;
            }
        }
        Category::ALL[best]
    }
}

/// Maps a classifier's probability vector onto the 16 decision categories.
pub trait CategoryMapping {
    /// Width of the probability vectors this mapping accepts.
    fn input_width(&self) -> usize;

    /// Reduce `probabilities` to per-category scores.
    fn map(&self, probabilities: &[f32]) -> CoreResult<CategoryScores>;

    /// Reduce and return the arg-max category alongside the scores.
    fn decide(&self, probabilities: &[f32]) -> CoreResult<(Category, CategoryScores)> {
        let scores = self.map(probabilities)?;
        Ok((scores.argmax(), scores))
    }
}

/// Averages probabilities over a fixed group of class indices per category.
///
/// Loaded from JSON of the form `{"airplane": [404], "bear": [294, 295, 296, 297], ...}`.
#[derive(Debug, Clone)]
pub struct IndexGroupMapping {
    groups: Vec<Vec<usize>>,
    input_width: usize,
}

impl IndexGroupMapping {
    /// Build from a per-category index list. Every category needs at least one index.
    pub fn new(groups: BTreeMap<Category, Vec<usize>>, input_width: usize) -> CoreResult<Self> {
        let mut ordered = Vec::with_capacity(CATEGORY_COUNT);
        for category in Category::ALL {
            let indices = groups.get(&category).cloned().unwrap_or_default();
            if indices.is_empty() {
                return Err(ShapeBiasError::InvalidConfig(format!(
                    "category mapping has no class indices for '{}'",
                    category
                )));
            }
            if let Some(&bad) = indices.iter().find(|&&i| i >= input_width) {
                return Err(ShapeBiasError::InvalidConfig(format!(
                    "class index {} for '{}' exceeds input width {}",
                    bad, category, input_width
                )));
            }
            ordered.push(indices);
        }
        Ok(Self {
            groups: ordered,
            input_width,
        })
    }

    /// Load a mapping file. Category names are validated against the fixed set.
    pub fn from_json_file(path: impl AsRef<Path>, input_width: usize) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            error!("Category mapping read failed for {}: {}", path.display(), e);
            ShapeBiasError::io(path, e)
        })?;
        let by_name: BTreeMap<String, Vec<usize>> = serde_json::from_str(&raw)?;
        let mut groups = BTreeMap::new();
        for (name, indices) in by_name {
            groups.insert(name.parse::<Category>()?, indices);
        }
        Self::new(groups, input_width)
    }
}

impl CategoryMapping for IndexGroupMapping {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn map(&self, probabilities: &[f32]) -> CoreResult<CategoryScores> {
        if probabilities.len() != self.input_width {
            return Err(ShapeBiasError::malformed(
                format!("probability vector of length {}", probabilities.len()),
                format!("mapping expects {} classes", self.input_width),
            ));
        }
        let averaged: Vec<f32> = self
            .groups
            .iter()
            .map(|indices| {
                let sum: f32 = indices.iter().map(|&i| probabilities[i]).sum();
                sum / indices.len() as f32
            })
            .collect();
        CategoryScores::new(&averaged)
    }
}
