use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
#[error("failed to encode frame as {format}: {reason}")]
pub struct EncodeError {
    pub format: &'static str,
    pub reason: String,
}

/// Compresses a frame into an image file format held in memory.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError>;
}
