//! Row of a per-shape-category decision table.

use serde::{Deserialize, Serialize};

use crate::categories::Category;

use super::reducer::DecisionRecord;

/// Persisted form of a [`DecisionRecord`]. Flags are 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRow {
    #[serde(rename = "Stimulus")]
    pub stimulus: String,
    #[serde(rename = "Shape")]
    pub shape: Category,
    /// Texture specimen id, e.g. `truck3`.
    #[serde(rename = "Texture")]
    pub texture: String,
    #[serde(rename = "Decision")]
    pub decision: Category,
    #[serde(rename = "Shape Category Value")]
    pub shape_value: f32,
    #[serde(rename = "Texture Category Value")]
    pub texture_value: f32,
    #[serde(rename = "Decision Category Value")]
    pub decision_value: f32,
    #[serde(rename = "Shape Decision")]
    pub shape_decision: u8,
    #[serde(rename = "Texture Decision")]
    pub texture_decision: u8,
    #[serde(rename = "Neither")]
    pub neither: u8,
    #[serde(rename = "Restricted Decision")]
    pub restricted_decision: Category,
    #[serde(rename = "Restricted Shape Value")]
    pub restricted_shape_value: f32,
    #[serde(rename = "Restricted Texture Value")]
    pub restricted_texture_value: f32,
    #[serde(rename = "Restricted Shape Decision")]
    pub restricted_shape_decision: u8,
    #[serde(rename = "Restricted Texture Decision")]
    pub restricted_texture_decision: u8,
}

impl From<&DecisionRecord> for DecisionRow {
    fn from(record: &DecisionRecord) -> Self {
        let stimulus = &record.stimulus;
        Self {
            stimulus: stimulus.name.clone(),
            shape: stimulus.shape,
            texture: stimulus.texture_spec.clone(),
            decision: record.decision,
            shape_value: record.scores.get(stimulus.shape),
            texture_value: record.scores.get(stimulus.texture),
            decision_value: record.scores.get(record.decision),
            shape_decision: record.is_shape_decision() as u8,
            texture_decision: record.is_texture_decision() as u8,
            neither: record.is_neither() as u8,
            restricted_decision: record.restricted_decision,
            restricted_shape_value: record.restricted_scores[0],
            restricted_texture_value: record.restricted_scores[1],
            restricted_shape_decision: record.is_restricted_shape() as u8,
            restricted_texture_decision: record.is_restricted_texture() as u8,
        }
    }
}
