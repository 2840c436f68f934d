use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::detection::domain::detection_error::DetectionError;
use crate::shared::bounding_box::BoundingBox;

/// Knobs of a multi-scale sliding-window scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Image pyramid step between scales (> 1.0).
    pub scale_factor: f64,
    /// Overlapping hits required before a window is reported.
    pub min_neighbors: u32,
    /// Smallest window side in pixels.
    pub min_size: u32,
    /// Largest window side in pixels, unbounded when `None`.
    #[serde(default)]
    pub max_size: Option<u32>,
}

impl ScanParams {
    pub const fn new(scale_factor: f64, min_neighbors: u32, min_size: u32) -> Self {
        Self {
            scale_factor,
            min_neighbors,
            min_size,
            max_size: None,
        }
    }

    pub const fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = Some(max_size);
        self
    }
}

/// Proposes smile/mouth-shaped sub-regions inside an image patch.
///
/// Returned boxes are local to `image` (the patch), in detector output order.
pub trait CandidateDetector: Send + Sync {
    fn detect_candidates(
        &self,
        image: &GrayImage,
        params: &ScanParams,
    ) -> Result<Vec<BoundingBox>, DetectionError>;
}
