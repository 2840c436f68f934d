use thiserror::Error;

use crate::video::domain::image_encoder::EncodeError;

/// Failures raised by the detector primitives (face scan, candidate scan,
/// landmark prediction). Absence of faces or candidates is not an error.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("face detection failed: {0}")]
    FaceDetector(String),
    #[error("smile candidate detection failed: {0}")]
    CandidateDetector(String),
    #[error("landmark prediction failed: {0}")]
    LandmarkPredictor(String),
    #[error("expected {expected} landmark points, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
}

/// Error half of a smile detection call.
///
/// "No smile" is `Ok(None)`; these variants are genuine faults, kept
/// apart so an encode failure never looks like an empty result.
#[derive(Error, Debug)]
pub enum SmileError {
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
