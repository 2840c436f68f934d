use image::GrayImage;

use crate::detection::domain::detection_error::DetectionError;
use crate::shared::bounding_box::BoundingBox;

/// Domain interface for locating faces in a single-channel image.
///
/// Implementations are shared by reference between request threads,
/// hence `&self` and `Sync`. Returned boxes are in image coordinates and
/// may overlap.
pub trait FaceDetector: Send + Sync {
    fn detect_faces(&self, image: &GrayImage) -> Result<Vec<BoundingBox>, DetectionError>;
}
