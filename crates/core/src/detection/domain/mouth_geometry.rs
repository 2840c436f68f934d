use serde::{Deserialize, Serialize};

use crate::detection::domain::landmark_set::LandmarkSet;

const LEFT_CORNER: usize = 48;
const RIGHT_CORNER: usize = 54;
const UPPER_LIP_TOP: usize = 51;
const LOWER_LIP_BOTTOM: usize = 57;
const INNER_UPPER_LIP: usize = 62;
const INNER_LOWER_LIP: usize = 66;

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Mouth opening over mouth width; 0.0 when the corners coincide.
pub fn mouth_aspect_ratio(lm: &LandmarkSet) -> f64 {
    let vertical = distance(lm.point(UPPER_LIP_TOP), lm.point(LOWER_LIP_BOTTOM));
    let horizontal = distance(lm.point(LEFT_CORNER), lm.point(RIGHT_CORNER));
    if horizontal == 0.0 {
        return 0.0;
    }
    vertical / horizontal
}

/// Gap between the inner lips in pixels.
pub fn lip_height(lm: &LandmarkSet) -> f64 {
    distance(lm.point(INNER_UPPER_LIP), lm.point(INNER_LOWER_LIP))
}

/// Mean y of the mouth corners minus y of the upper lip top. Image y
/// grows downward; positive values are treated as the smile curve.
pub fn mouth_arc(lm: &LandmarkSet) -> f64 {
    let corners_y = (lm.point(LEFT_CORNER).1 + lm.point(RIGHT_CORNER).1) / 2.0;
    corners_y - lm.point(UPPER_LIP_TOP).1
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthMeasures {
    pub aspect_ratio: f64,
    pub lip_height: f64,
    pub arc: f64,
}

impl MouthMeasures {
    pub fn from_landmarks(lm: &LandmarkSet) -> Self {
        Self {
            aspect_ratio: mouth_aspect_ratio(lm),
            lip_height: lip_height(lm),
            arc: mouth_arc(lm),
        }
    }
}

/// Empirical cut-offs; each satisfied one adds a point to the score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileThresholds {
    pub min_aspect_ratio: f64,
    pub min_lip_height: f64,
    pub min_arc: f64,
    pub min_score: u32,
}

impl Default for SmileThresholds {
    fn default() -> Self {
        Self {
            min_aspect_ratio: 0.36,
            min_lip_height: 6.0,
            min_arc: 0.0,
            min_score: 2,
        }
    }
}

impl SmileThresholds {
    /// Number of measures strictly above their threshold (0..=3).
    pub fn score(&self, m: &MouthMeasures) -> u32 {
        [
            m.aspect_ratio > self.min_aspect_ratio,
            m.lip_height > self.min_lip_height,
            m.arc > self.min_arc,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as u32
    }

    pub fn accepts(&self, m: &MouthMeasures) -> bool {
        self.score(m) >= self.min_score
    }
}
