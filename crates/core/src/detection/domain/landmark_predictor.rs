use image::GrayImage;

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::bounding_box::BoundingBox;

/// Locates the 68 facial landmarks of one face, in image coordinates.
pub trait LandmarkPredictor: Send + Sync {
    fn predict(&self, image: &GrayImage, face: &BoundingBox)
        -> Result<LandmarkSet, DetectionError>;
}
