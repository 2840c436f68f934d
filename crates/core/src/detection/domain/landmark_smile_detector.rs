use std::sync::Arc;

use crate::detection::domain::detection_error::SmileError;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::detection::domain::mouth_geometry::{MouthMeasures, SmileThresholds};
use crate::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use crate::shared::annotate::{draw_dot, draw_rectangle, BOX_COLOR, BOX_THICKNESS, LANDMARK_COLOR};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::video::domain::image_encoder::ImageEncoder;

/// Landmark strategy: three mouth measures per face, accepted by score.
///
/// The reported box encloses the 20 mouth landmarks of each accepted face.
pub struct LandmarkSmileDetector {
    faces: Arc<dyn FaceDetector>,
    landmarks: Arc<dyn LandmarkPredictor>,
    encoder: Arc<dyn ImageEncoder>,
    thresholds: SmileThresholds,
    mark_landmarks: bool,
}

impl LandmarkSmileDetector {
    pub fn new(
        faces: Arc<dyn FaceDetector>,
        landmarks: Arc<dyn LandmarkPredictor>,
        encoder: Arc<dyn ImageEncoder>,
        thresholds: SmileThresholds,
    ) -> Self {
        Self {
            faces,
            landmarks,
            encoder,
            thresholds,
            mark_landmarks: true,
        }
    }

    /// Whether mouth points are dotted onto the encoded image.
    pub fn with_landmark_marks(mut self, enabled: bool) -> Self {
        self.mark_landmarks = enabled;
        self
    }

    pub fn thresholds(&self) -> &SmileThresholds {
        &self.thresholds
    }
}

impl SmileDetector for LandmarkSmileDetector {
    fn detect(&self, frame: &Frame) -> Result<Option<SmileDetection>, SmileError> {
        let gray = frame.to_gray();
        let faces = self.faces.detect_faces(&gray)?;

        let mut annotated = frame.clone();
        let mut boxes = Vec::new();

        for face in &faces {
            let landmarks = self.landmarks.predict(&gray, face)?;
            let measures = MouthMeasures::from_landmarks(&landmarks);
            let score = self.thresholds.score(&measures);

            log::debug!(
                "MAR={:.2}, LipHeight={:.2}, Arc={:.2}, score={score}",
                measures.aspect_ratio,
                measures.lip_height,
                measures.arc
            );

            if score >= self.thresholds.min_score {
                let mouth_box = BoundingBox::enclosing(landmarks.mouth())
                    .and_then(|b| b.clamp_to(frame.width(), frame.height()));
                if let Some(b) = mouth_box {
                    draw_rectangle(&mut annotated, &b, BOX_COLOR, BOX_THICKNESS);
                    boxes.push(b);
                }
            }

            if self.mark_landmarks {
                for &(x, y) in landmarks.mouth() {
                    draw_dot(&mut annotated, x, y, 1, LANDMARK_COLOR);
                }
            }
        }

        if boxes.is_empty() {
            return Ok(None);
        }

        let image = self.encoder.encode(&annotated).map_err(|e| {
            log::error!("{e}");
            e
        })?;

        Ok(Some(SmileDetection { image, boxes }))
    }
}
