use crate::video::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};

/// Opener used when the crate is built without camera support; every open
/// fails with [`CaptureError::Unsupported`].
pub struct UnavailableCameraOpener;

impl CameraOpener for UnavailableCameraOpener {
    fn open(&self, _index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_unsupported() {
        assert!(matches!(
            UnavailableCameraOpener.open(0),
            Err(CaptureError::Unsupported)
        ));
    }
}
