//! Stimulus identifiers and triplet construction.
//!
//! A stimulus name encodes a shape specimen and a texture specimen, e.g.
//! `cat4-truck3` is specimen 4 of the cat shape rendered with texture
//! specimen 3 of truck. Image extensions are stripped on parse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::categories::Category;
use crate::error::{CoreResult, ShapeBiasError};

/// A single cue-conflict (or control) stimulus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stimulus {
    /// Identifier without extension, e.g. `cat4-truck3`.
    pub name: String,
    pub shape: Category,
    pub texture: Category,
    /// Shape specimen id, e.g. `cat4`.
    pub shape_spec: String,
    /// Texture specimen id, e.g. `truck3`.
    pub texture_spec: String,
}

impl Stimulus {
    /// Parse `<shape><n>-<texture><m>[.ext]`.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let name = match raw.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => raw,
        };

        let (shape_part, texture_part) = name
            .split_once('-')
            .ok_or_else(|| ShapeBiasError::malformed(raw, "expected '<shape>-<texture>'"))?;
        if texture_part.contains('-') {
            return Err(ShapeBiasError::malformed(raw, "more than one '-' separator"));
        }

        let (shape, _) = split_specimen(raw, shape_part)?;
        let (texture, _) = split_specimen(raw, texture_part)?;

        Ok(Self {
            name: name.to_string(),
            shape,
            texture,
            shape_spec: shape_part.to_string(),
            texture_spec: texture_part.to_string(),
        })
    }

    /// Shape and texture categories differ.
    #[inline]
    pub fn is_cue_conflict(&self) -> bool {
        self.shape != self.texture
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Split `cat4` into (`Category::Cat`, 4).
fn split_specimen(raw: &str, part: &str) -> CoreResult<(Category, u32)> {
    let digits_at = part
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ShapeBiasError::malformed(raw, format!("specimen '{}' has no id", part)))?;
    let (label, digits) = part.split_at(digits_at);
    let id = digits
        .parse::<u32>()
        .map_err(|_| ShapeBiasError::malformed(raw, format!("specimen id '{}' is not numeric", digits)))?;
    Ok((label.parse::<Category>()?, id))
}

/// Parse a list of stimulus names, failing on the first malformed one.
pub fn parse_stimuli<I, S>(names: I) -> CoreResult<Vec<Stimulus>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|n| Stimulus::parse(n.as_ref())).collect()
}

/// (anchor, shape-match, texture-match) by stimulus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub anchor: String,
    pub shape_match: String,
    pub texture_match: String,
}

/// All triplets belonging to one anchor.
#[derive(Debug, Clone)]
pub struct AnchorTriplets {
    pub anchor: Stimulus,
    pub triplets: Vec<Triplet>,
}

/// Triplets grouped by anchor, in anchor order.
#[derive(Debug, Clone, Default)]
pub struct TripletSet {
    anchors: Vec<AnchorTriplets>,
}

impl TripletSet {
    pub fn new(anchors: Vec<AnchorTriplets>) -> Self {
        Self { anchors }
    }

    pub fn anchors(&self) -> &[AnchorTriplets] {
        &self.anchors
    }

    /// Total triplet count across anchors.
    pub fn len(&self) -> usize {
        self.anchors.iter().map(|a| a.triplets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerate every valid triplet over the cue-conflict stimuli.
///
/// Shape-match: same shape category as the anchor, different texture
/// category. Texture-match: same texture category, different shape
/// category. Anchors with no valid triplet are omitted.
pub fn enumerate_triplets(stimuli: &[Stimulus]) -> TripletSet {
    let conflict: Vec<&Stimulus> = stimuli.iter().filter(|s| s.is_cue_conflict()).collect();

    let mut anchors = Vec::new();
    for anchor in &conflict {
        let shape_matches: Vec<&Stimulus> = conflict
            .iter()
            .copied()
            .filter(|s| s.shape == anchor.shape && s.texture != anchor.texture)
            .collect();
        let texture_matches: Vec<&Stimulus> = conflict
            .iter()
            .copied()
            .filter(|s| s.texture == anchor.texture && s.shape != anchor.shape)
            .collect();

        let mut triplets = Vec::with_capacity(shape_matches.len() * texture_matches.len());
        for shape_match in &shape_matches {
            for texture_match in &texture_matches {
                triplets.push(Triplet {
                    anchor: anchor.name.clone(),
                    shape_match: shape_match.name.clone(),
                    texture_match: texture_match.name.clone(),
                });
            }
        }

        if !triplets.is_empty() {
            anchors.push(AnchorTriplets {
                anchor: (*anchor).clone(),
                triplets,
            });
        }
    }

    TripletSet::new(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cue_conflict_name() {
        let s = Stimulus::parse("cat4-truck3.png").unwrap();
        assert_eq!(s.name, "cat4-truck3");
        assert_eq!(s.shape, Category::Cat);
        assert_eq!(s.texture, Category::Truck);
        assert_eq!(s.shape_spec, "cat4");
        assert_eq!(s.texture_spec, "truck3");
        assert!(s.is_cue_conflict());
        println!("[PASS] Parsed {:?}", s);
    }

    #[test]
    fn test_parse_control_stimulus() {
        let s = Stimulus::parse("clock1-clock2").unwrap();
        assert!(!s.is_cue_conflict());
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        for bad in ["cat4", "cat-truck3", "giraffe1-cat2", "cat4-truck3-dog1", "cat4-truckx"] {
            let err = Stimulus::parse(bad).unwrap_err();
            assert!(
                matches!(err, ShapeBiasError::MalformedInput { .. }),
                "{} should be malformed, got {:?}",
                bad,
                err
            );
        }
        println!("[PASS] Malformed stimulus names rejected at ingestion");
    }

    #[test]
    fn test_enumerate_triplets_respects_match_rules() {
        let stimuli = parse_stimuli([
            "cat1-truck1",
            "cat2-dog1",
            "bear1-truck2",
            "dog1-dog2",
            "cat3-truck2",
        ])
        .unwrap();
        let set = enumerate_triplets(&stimuli);

        let first = &set.anchors()[0];
        assert_eq!(first.anchor.name, "cat1-truck1");
        assert_eq!(
            first.triplets,
            vec![Triplet {
                anchor: "cat1-truck1".into(),
                shape_match: "cat2-dog1".into(),
                texture_match: "bear1-truck2".into(),
            }]
        );

        for a in set.anchors() {
            for t in &a.triplets {
                let anchor = Stimulus::parse(&t.anchor).unwrap();
                let sm = Stimulus::parse(&t.shape_match).unwrap();
                let tm = Stimulus::parse(&t.texture_match).unwrap();
                assert_eq!(sm.shape, anchor.shape);
                assert_ne!(sm.texture, anchor.texture);
                assert_eq!(tm.texture, anchor.texture);
                assert_ne!(tm.shape, anchor.shape);
                assert!(anchor.is_cue_conflict() && sm.is_cue_conflict() && tm.is_cue_conflict());
            }
        }
        println!("[PASS] {} triplets over {} anchors", set.len(), set.anchors().len());
    }

    #[test]
    fn test_enumerate_triplets_skips_controls() {
        let stimuli = parse_stimuli(["dog1-dog2", "dog3-dog1"]).unwrap();
        assert!(enumerate_triplets(&stimuli).is_empty());
    }
}
