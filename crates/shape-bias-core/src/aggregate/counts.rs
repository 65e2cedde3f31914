//! Filtered decision counter.

use serde::{Deserialize, Serialize};

use crate::decision::{DecisionRecord, DecisionRow};

/// Decision counts for one shape category or the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    pub shape: u64,
    pub texture: u64,
    pub neither: u64,
    pub restricted_shape: u64,
    pub restricted_texture: u64,
}

impl DecisionCounts {
    /// Stimuli counted: shape + texture + neither.
    #[inline]
    pub fn total(&self) -> u64 {
        self.shape + self.texture + self.neither
    }

    /// Count one record if its restricted flags disagree.
    ///
    /// Returns whether the record passed the filter.
    pub fn tally(
        &mut self,
        shape: bool,
        texture: bool,
        neither: bool,
        restricted_shape: bool,
        restricted_texture: bool,
    ) -> bool {
        if restricted_shape == restricted_texture {
            return false;
        }
        self.shape += shape as u64;
        self.texture += texture as u64;
        self.neither += neither as u64;
        self.restricted_shape += restricted_shape as u64;
        self.restricted_texture += restricted_texture as u64;
        true
    }

    pub fn tally_record(&mut self, record: &DecisionRecord) -> bool {
        self.tally(
            record.is_shape_decision(),
            record.is_texture_decision(),
            record.is_neither(),
            record.is_restricted_shape(),
            record.is_restricted_texture(),
        )
    }

    pub fn tally_row(&mut self, row: &DecisionRow) -> bool {
        self.tally(
            row.shape_decision != 0,
            row.texture_decision != 0,
            row.neither != 0,
            row.restricted_shape_decision != 0,
            row.restricted_texture_decision != 0,
        )
    }

    pub fn merge(&mut self, other: &DecisionCounts) {
        self.shape += other.shape;
        self.texture += other.texture;
        self.neither += other.neither;
        self.restricted_shape += other.restricted_shape;
        self.restricted_texture += other.restricted_texture;
    }
}
