use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera device {index} could not be opened: {reason}")]
    Open { index: i32, reason: String },
    #[error("failed to read frame from camera: {0}")]
    Read(String),
    #[error("camera support is not available in this build")]
    Unsupported,
}

/// An opened camera. Dropping without `release` is allowed; `release`
/// exists so owners can free the device at a well-defined point.
pub trait CaptureDevice: Send {
    /// Blocks until one frame is available. A failed read is transient;
    /// callers may keep reading.
    fn read(&mut self) -> Result<Frame, CaptureError>;

    fn release(&mut self);
}

/// Opens camera devices by index.
pub trait CameraOpener: Send + Sync {
    fn open(&self, index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}
