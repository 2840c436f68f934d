use std::path::Path;
use std::sync::Mutex;

use image::GrayImage;
use opencv::core::{Mat, Rect, Scalar, Size, Vector, CV_8UC1};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::detection::domain::candidate_detector::{CandidateDetector, ScanParams};
use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;

/// Haar cascade behind OpenCV's `CascadeClassifier`. Scans for candidates
/// with per-call parameters.
pub struct OpenCvCascade {
    classifier: Mutex<CascadeClassifier>,
}

impl OpenCvCascade {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let path_str = path.to_str().ok_or("cascade path is not valid UTF-8")?;
        let classifier = CascadeClassifier::new(path_str)?;
        if classifier.empty()? {
            return Err(format!("failed to load cascade from {}", path.display()).into());
        }
        log::debug!("Loaded cascade {}", path.display());
        Ok(Self::from_classifier(classifier))
    }

    pub fn from_classifier(classifier: CascadeClassifier) -> Self {
        Self {
            classifier: Mutex::new(classifier),
        }
    }

    fn scan(&self, image: &GrayImage, params: &ScanParams) -> Result<Vec<BoundingBox>, String> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }
        let mat = to_mat(image).map_err(|e| e.to_string())?;
        let mut found = Vector::<Rect>::new();
        let max = params.max_size.unwrap_or(0) as i32;

        let mut classifier = self
            .classifier
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        classifier
            .detect_multi_scale(
                &mat,
                &mut found,
                params.scale_factor,
                params.min_neighbors as i32,
                0,
                Size::new(params.min_size as i32, params.min_size as i32),
                Size::new(max, max),
            )
            .map_err(|e| e.to_string())?;

        Ok(found
            .iter()
            .map(|r| BoundingBox::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}

/// A cascade used for faces, scanned with fixed parameters.
pub struct CascadeFaceDetector {
    cascade: OpenCvCascade,
    scan: ScanParams,
}

impl CascadeFaceDetector {
    pub fn new(cascade: OpenCvCascade, scan: ScanParams) -> Self {
        Self { cascade, scan }
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<BoundingBox>, DetectionError> {
        self.cascade
            .scan(gray, &self.scan)
            .map_err(DetectionError::FaceDetector)
    }
}

impl CandidateDetector for OpenCvCascade {
    fn detect_candidates(
        &self,
        image: &GrayImage,
        params: &ScanParams,
    ) -> Result<Vec<BoundingBox>, DetectionError> {
        self.scan(image, params)
            .map_err(DetectionError::CandidateDetector)
    }
}

fn to_mat(image: &GrayImage) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        CV_8UC1,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(image.as_raw());
    Ok(mat)
}
