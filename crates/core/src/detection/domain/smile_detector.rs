use crate::detection::domain::detection_error::SmileError;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Encoded (annotated) frame plus one box per smiling face.
///
/// Only constructed when at least one face was accepted, so `boxes` is
/// never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SmileDetection {
    pub image: Vec<u8>,
    pub boxes: Vec<BoundingBox>,
}

/// Capability shared by both detection strategies: one frame in, either
/// nothing or an encoded image with frame-absolute boxes out.
pub trait SmileDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Option<SmileDetection>, SmileError>;

    /// Same as [`detect`](Self::detect) for callers that may not have a
    /// frame yet; an absent frame is simply "no result".
    fn detect_optional(&self, frame: Option<&Frame>) -> Result<Option<SmileDetection>, SmileError> {
        match frame {
            Some(frame) => self.detect(frame),
            None => {
                log::warn!("No frame received for smile detection");
                Ok(None)
            }
        }
    }
}
