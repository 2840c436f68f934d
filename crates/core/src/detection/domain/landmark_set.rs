//! 68-point facial landmarks in the iBUG 300-W ordering.
//!
//! Index ranges: jaw 0-16, brows 17-26, nose 27-35, eyes 36-47,
//! mouth 48-67 (outer lip 48-59, inner lip 60-67).

use std::ops::Range;

use crate::detection::domain::detection_error::DetectionError;

pub const LANDMARK_COUNT: usize = 68;

/// Outer and inner lip points.
pub const MOUTH: Range<usize> = 48..68;

#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [(f64, f64); LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [(f64, f64); LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Builds a set from predictor output, rejecting anything but 68 points.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, DetectionError> {
        let points: [(f64, f64); LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| DetectionError::LandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64); LANDMARK_COUNT] {
        &self.points
    }

    pub fn point(&self, index: usize) -> (f64, f64) {
        self.points[index]
    }

    /// The 20 mouth points, indices 48 through 67.
    pub fn mouth(&self) -> &[(f64, f64)] {
        &self.points[MOUTH]
    }

    /// Shifts every point, e.g. from crop-local to frame coordinates.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.0 += dx;
            p.1 += dy;
        }
        Self { points }
    }
}
