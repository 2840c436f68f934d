use std::sync::Arc;

use image::GrayImage;

use crate::detection::domain::candidate_detector::CandidateDetector;
use crate::detection::domain::candidate_filter::RegionHeuristics;
use crate::detection::domain::detection_error::{DetectionError, SmileError};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use crate::shared::annotate::{draw_rectangle, BOX_COLOR, BOX_THICKNESS};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::intensity::{crop, equalize_histogram};
use crate::video::domain::image_encoder::ImageEncoder;

/// Cascade-style strategy: face boxes, then smile candidates inside each
/// face, filtered by shape and position.
///
/// Each face contributes at most one box, the largest accepted candidate,
/// translated back to frame coordinates.
pub struct RegionSmileDetector {
    faces: Arc<dyn FaceDetector>,
    candidates: Arc<dyn CandidateDetector>,
    encoder: Arc<dyn ImageEncoder>,
    heuristics: RegionHeuristics,
}

impl RegionSmileDetector {
    pub fn new(
        faces: Arc<dyn FaceDetector>,
        candidates: Arc<dyn CandidateDetector>,
        encoder: Arc<dyn ImageEncoder>,
        heuristics: RegionHeuristics,
    ) -> Self {
        Self {
            faces,
            candidates,
            encoder,
            heuristics,
        }
    }

    pub fn heuristics(&self) -> &RegionHeuristics {
        &self.heuristics
    }

    /// Frame-absolute smile box for one face, if any candidate qualifies.
    fn best_smile(
        &self,
        gray: &GrayImage,
        face: &BoundingBox,
    ) -> Result<Option<BoundingBox>, DetectionError> {
        let Some(search) = self
            .heuristics
            .search_area
            .region_of(face)
            .clamp_to(gray.width(), gray.height())
        else {
            return Ok(None);
        };
        let Some(patch) = crop(gray, &search) else {
            return Ok(None);
        };

        let found = self
            .candidates
            .detect_candidates(&patch, &self.heuristics.smile_scan)?;

        // Patch-local → face-local, so the position gate is measured from
        // the top of the face whichever area was scanned.
        let dx = search.x - face.x;
        let dy = search.y - face.y;
        let face_local: Vec<BoundingBox> = found.iter().map(|c| c.translate(dx, dy)).collect();

        log::debug!(
            "Face {face:?}: {} smile candidates",
            face_local.len()
        );

        Ok(self
            .heuristics
            .select_best(face, &face_local)
            .map(|best| best.translate(face.x, face.y))
            .filter(BoundingBox::is_valid))
    }
}

impl SmileDetector for RegionSmileDetector {
    fn detect(&self, frame: &Frame) -> Result<Option<SmileDetection>, SmileError> {
        let mut gray = frame.to_gray();
        if self.heuristics.equalize_histogram {
            gray = equalize_histogram(&gray);
        }

        let faces = self.faces.detect_faces(&gray)?;
        let mut boxes = Vec::new();
        for face in &faces {
            if let Some(smile) = self.best_smile(&gray, face)? {
                boxes.push(smile);
            }
        }

        log::debug!(
            "Faces found: {} | accepted smiles: {}",
            faces.len(),
            boxes.len()
        );

        if boxes.is_empty() {
            return Ok(None);
        }

        let mut annotated = frame.clone();
        for b in &boxes {
            draw_rectangle(&mut annotated, b, BOX_COLOR, BOX_THICKNESS);
        }
        let image = self.encoder.encode(&annotated).map_err(|e| {
            log::error!("{e}");
            e
        })?;

        Ok(Some(SmileDetection { image, boxes }))
    }
}
