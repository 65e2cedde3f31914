//! Per-triplet similarity rows and closer indicators.

use serde::{Deserialize, Serialize};

use crate::similarity::PairwiseSimilarity;

/// Which leg is closer to the anchor under each measure.
///
/// Dot and cosine favor shape only when strictly greater; Euclidean favors
/// shape only when strictly smaller. Ties go to texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Closeness {
    pub shape_dot: bool,
    pub shape_cos: bool,
    pub shape_ed: bool,
}

impl Closeness {
    pub fn compare(shape: &PairwiseSimilarity, texture: &PairwiseSimilarity) -> Self {
        Self {
            shape_dot: shape.dot > texture.dot,
            shape_cos: shape.cosine > texture.cosine,
            shape_ed: shape.euclidean < texture.euclidean,
        }
    }
}

/// One row of a per-anchor similarity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Anchor")]
    pub anchor: String,
    /// Anchor's shape specimen id.
    #[serde(rename = "Anchor Shape")]
    pub anchor_shape: String,
    /// Anchor's texture specimen id.
    #[serde(rename = "Anchor Texture")]
    pub anchor_texture: String,
    #[serde(rename = "Shape Match")]
    pub shape_match: String,
    #[serde(rename = "Texture Match")]
    pub texture_match: String,
    #[serde(rename = "Shape Dot")]
    pub shape_dot: f32,
    #[serde(rename = "Shape Cos")]
    pub shape_cos: f32,
    #[serde(rename = "Shape ED")]
    pub shape_ed: f32,
    #[serde(rename = "Texture Dot")]
    pub texture_dot: f32,
    #[serde(rename = "Texture Cos")]
    pub texture_cos: f32,
    #[serde(rename = "Texture ED")]
    pub texture_ed: f32,
    #[serde(rename = "Shape Dot Closer")]
    pub shape_dot_closer: u8,
    #[serde(rename = "Shape Cos Closer")]
    pub shape_cos_closer: u8,
    #[serde(rename = "Shape ED Closer")]
    pub shape_ed_closer: u8,
    #[serde(rename = "Texture Dot Closer")]
    pub texture_dot_closer: u8,
    #[serde(rename = "Texture Cos Closer")]
    pub texture_cos_closer: u8,
    #[serde(rename = "Texture ED Closer")]
    pub texture_ed_closer: u8,
}

/// The six 0/1 closer columns of a similarity row; other columns are ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CloserFlags {
    #[serde(rename = "Shape Dot Closer")]
    pub shape_dot: u8,
    #[serde(rename = "Shape Cos Closer")]
    pub shape_cos: u8,
    #[serde(rename = "Shape ED Closer")]
    pub shape_ed: u8,
    #[serde(rename = "Texture Dot Closer")]
    pub texture_dot: u8,
    #[serde(rename = "Texture Cos Closer")]
    pub texture_cos: u8,
    #[serde(rename = "Texture ED Closer")]
    pub texture_ed: u8,
}

impl From<Closeness> for CloserFlags {
    fn from(c: Closeness) -> Self {
        Self {
            shape_dot: c.shape_dot as u8,
            shape_cos: c.shape_cos as u8,
            shape_ed: c.shape_ed as u8,
            texture_dot: !c.shape_dot as u8,
            texture_cos: !c.shape_cos as u8,
            texture_ed: !c.shape_ed as u8,
        }
    }
}

/// Names of the three stimuli in a row plus the anchor's specimen ids.
#[derive(Debug, Clone, Copy)]
pub struct RowLabels<'a> {
    pub anchor: &'a str,
    pub anchor_shape: &'a str,
    pub anchor_texture: &'a str,
    pub shape_match: &'a str,
    pub texture_match: &'a str,
}

impl SimilarityRecord {
    pub fn new(
        model: &str,
        labels: RowLabels<'_>,
        shape: &PairwiseSimilarity,
        texture: &PairwiseSimilarity,
    ) -> Self {
        let flags = CloserFlags::from(Closeness::compare(shape, texture));
        Self {
            model: model.to_string(),
            anchor: labels.anchor.to_string(),
            anchor_shape: labels.anchor_shape.to_string(),
            anchor_texture: labels.anchor_texture.to_string(),
            shape_match: labels.shape_match.to_string(),
            texture_match: labels.texture_match.to_string(),
            shape_dot: shape.dot,
            shape_cos: shape.cosine,
            shape_ed: shape.euclidean,
            texture_dot: texture.dot,
            texture_cos: texture.cosine,
            texture_ed: texture.euclidean,
            shape_dot_closer: flags.shape_dot,
            shape_cos_closer: flags.shape_cos,
            shape_ed_closer: flags.shape_ed,
            texture_dot_closer: flags.texture_dot,
            texture_cos_closer: flags.texture_cos,
            texture_ed_closer: flags.texture_ed,
        }
    }

    pub fn flags(&self) -> CloserFlags {
        CloserFlags {
            shape_dot: self.shape_dot_closer,
            shape_cos: self.shape_cos_closer,
            shape_ed: self.shape_ed_closer,
            texture_dot: self.texture_dot_closer,
            texture_cos: self.texture_cos_closer,
            texture_ed: self.texture_ed_closer,
        }
    }

    pub fn shape_measures(&self) -> PairwiseSimilarity {
        PairwiseSimilarity {
            dot: self.shape_dot,
            cosine: self.shape_cos,
            euclidean: self.shape_ed,
        }
    }

    pub fn texture_measures(&self) -> PairwiseSimilarity {
        PairwiseSimilarity {
            dot: self.texture_dot,
            cosine: self.texture_cos,
            euclidean: self.texture_ed,
        }
    }
}
