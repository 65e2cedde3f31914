//! Decision reducer.

use serde::{Deserialize, Serialize};

use crate::categories::{Category, CategoryMapping, CategoryScores};
use crate::error::CoreResult;
use crate::softmax::{softmax, softmax_pair};
use crate::stimulus::Stimulus;

/// One model decision for one stimulus. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub stimulus: Stimulus,
    /// Arg-max over all 16 categories.
    pub decision: Category,
    pub scores: CategoryScores,
    /// Arg-max restricted to {shape, texture}.
    pub restricted_decision: Category,
    /// Softmax of `[shape score, texture score]`.
    pub restricted_scores: [f32; 2],
}

impl DecisionRecord {
    pub fn is_shape_decision(&self) -> bool {
        self.decision == self.stimulus.shape
    }

    pub fn is_texture_decision(&self) -> bool {
        self.decision == self.stimulus.texture
    }

    pub fn is_neither(&self) -> bool {
        !self.is_shape_decision() && !self.is_texture_decision()
    }

    pub fn is_restricted_shape(&self) -> bool {
        self.restricted_decision == self.stimulus.shape
    }

    pub fn is_restricted_texture(&self) -> bool {
        self.restricted_decision == self.stimulus.texture
    }
}

/// Reduce a category score vector to unrestricted and restricted decisions.
///
/// The restricted decision is shape only when its score is strictly greater
/// than the texture score; an exact tie goes to texture.
pub fn reduce(stimulus: &Stimulus, scores: CategoryScores) -> DecisionRecord {
    let shape_score = scores.get(stimulus.shape);
    let texture_score = scores.get(stimulus.texture);

    let restricted_decision = if shape_score > texture_score {
        stimulus.shape
    } else {
        stimulus.texture
    };

    DecisionRecord {
        stimulus: stimulus.clone(),
        decision: scores.argmax(),
        scores,
        restricted_decision,
        restricted_scores: softmax_pair(shape_score, texture_score),
    }
}

/// Logits -> softmax probabilities -> category scores -> decision record.
pub fn classify<M: CategoryMapping + ?Sized>(
    stimulus: &Stimulus,
    logits: &[f32],
    mapping: &M,
) -> CoreResult<DecisionRecord> {
    let probabilities = softmax(logits)?;
    let scores = mapping.map(&probabilities)?;
    Ok(reduce(stimulus, scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{IndexGroupMapping, CATEGORY_COUNT};
    use std::collections::BTreeMap;

    fn scores_with(pairs: &[(Category, f32)]) -> CategoryScores {
        let mut v = [0.0f32; CATEGORY_COUNT];
        for &(c, s) in pairs {
            v[c.index()] = s;
        }
        CategoryScores::new(&v).unwrap()
    }

    #[test]
    fn test_reduce_cat4_truck3_scenario() {
        let stimulus = Stimulus::parse("cat4-truck3").unwrap();
        let scores = scores_with(&[(Category::Cat, 0.7), (Category::Truck, 0.2)]);

        let record = reduce(&stimulus, scores);

        assert_eq!(record.decision, Category::Cat);
        assert_eq!(record.restricted_decision, Category::Cat);
        let expected_shape = 1.0 / (1.0 + (-0.5f32).exp());
        assert!((record.restricted_scores[0] - expected_shape).abs() < 1e-6);
        assert!((record.restricted_scores[1] - (1.0 - expected_shape)).abs() < 1e-6);
        assert!(record.is_shape_decision());
        assert!(!record.is_neither());
        println!(
            "[PASS] cat4-truck3 -> decision={}, restricted={}, vector=[{:.4}, {:.4}]",
            record.decision,
            record.restricted_decision,
            record.restricted_scores[0],
            record.restricted_scores[1]
        );
    }

    #[test]
    fn test_restricted_decision_follows_higher_raw_score() {
        let stimulus = Stimulus::parse("dog2-clock1").unwrap();
        let scores = scores_with(&[
            (Category::Dog, 0.1),
            (Category::Clock, 0.3),
            (Category::Oven, 0.5),
        ]);
        let record = reduce(&stimulus, scores);

        assert_eq!(record.decision, Category::Oven);
        assert!(record.is_neither());
        assert_eq!(record.restricted_decision, Category::Clock);
        assert!(record.is_restricted_texture());
        let sum: f32 = record.restricted_scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(record.restricted_scores[1] > record.restricted_scores[0]);
    }

    #[test]
    fn test_restricted_tie_goes_to_texture() {
        let stimulus = Stimulus::parse("bear1-knife2").unwrap();
        let scores = scores_with(&[(Category::Bear, 0.25), (Category::Knife, 0.25)]);
        let record = reduce(&stimulus, scores);
        assert_eq!(record.restricted_decision, Category::Knife);
        assert_eq!(record.restricted_scores, [0.5, 0.5]);
        println!("[PASS] Strict '>' sends exact ties to texture");
    }

    #[test]
    fn test_control_stimulus_sets_both_restricted_flags() {
        let stimulus = Stimulus::parse("oven1-oven3").unwrap();
        let record = reduce(&stimulus, scores_with(&[(Category::Oven, 0.9)]));
        assert!(record.is_restricted_shape());
        assert!(record.is_restricted_texture());
        assert!(record.is_shape_decision() && record.is_texture_decision());
    }

    #[test]
    fn test_classify_applies_softmax_then_mapping() {
        let mut groups = BTreeMap::new();
        for c in Category::ALL {
            groups.insert(c, vec![c.index()]);
        }
        let mapping = IndexGroupMapping::new(groups, CATEGORY_COUNT).unwrap();

        let mut logits = vec![0.0f32; CATEGORY_COUNT];
        logits[Category::Truck.index()] = 5.0;
        logits[Category::Cat.index()] = 1.0;

        let stimulus = Stimulus::parse("cat4-truck3").unwrap();
        let record = classify(&stimulus, &logits, &mapping).unwrap();

        assert_eq!(record.decision, Category::Truck);
        assert_eq!(record.restricted_decision, Category::Truck);
        let total: f32 = record.scores.as_slice().iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
    }
}
