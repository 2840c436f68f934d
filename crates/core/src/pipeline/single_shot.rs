use crate::detection::domain::detection_error::SmileError;
use crate::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use crate::video::domain::capture_device::CameraOpener;

/// Opens the camera, grabs one frame, releases the camera, then detects.
///
/// Device failures end the call with `Ok(None)` and a warning; detector
/// and encoder faults are returned as errors.
pub fn capture_and_detect(
    opener: &dyn CameraOpener,
    device_index: i32,
    detector: &dyn SmileDetector,
) -> Result<Option<SmileDetection>, SmileError> {
    let mut device = match opener.open(device_index) {
        Ok(device) => device,
        Err(e) => {
            log::warn!("Could not access the webcam: {e}");
            return Ok(None);
        }
    };

    let read = device.read();
    device.release();

    match read {
        Ok(frame) => detector.detect(&frame),
        Err(e) => {
            log::warn!("Failed to capture image from webcam: {e}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;
    use crate::video::domain::capture_device::{CaptureDevice, CaptureError};

    struct OneShotDevice {
        fail_read: bool,
        released: Arc<AtomicBool>,
    }

    impl CaptureDevice for OneShotDevice {
        fn read(&mut self) -> Result<Frame, CaptureError> {
            if self.fail_read {
                Err(CaptureError::Read("no signal".into()))
            } else {
                Ok(Frame::filled(4, 4, [1; 3]))
            }
        }
        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    struct Opener {
        available: bool,
        fail_read: bool,
        released: Arc<AtomicBool>,
    }

    impl Opener {
        fn new(available: bool, fail_read: bool) -> Self {
            Self {
                available,
                fail_read,
                released: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl CameraOpener for Opener {
        fn open(&self, index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
            if !self.available {
                return Err(CaptureError::Open {
                    index,
                    reason: "missing".into(),
                });
            }
            Ok(Box::new(OneShotDevice {
                fail_read: self.fail_read,
                released: self.released.clone(),
            }))
        }
    }

    #[derive(Default)]
    struct CountingDetector {
        calls: AtomicUsize,
    }

    impl SmileDetector for CountingDetector {
        fn detect(&self, _frame: &Frame) -> Result<Option<SmileDetection>, SmileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(SmileDetection {
                image: vec![1],
                boxes: vec![BoundingBox::new(0, 0, 2, 1)],
            }))
        }
    }

    #[test]
    fn test_detects_on_captured_frame_and_releases() {
        let opener = Opener::new(true, false);
        let detector = CountingDetector::default();
        let result = capture_and_detect(&opener, 0, &detector).unwrap();
        assert!(result.is_some());
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
        assert!(opener.released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_open_failure_is_no_result() {
        let detector = CountingDetector::default();
        let result = capture_and_detect(&Opener::new(false, false), 0, &detector).unwrap();
        assert!(result.is_none());
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_read_failure_is_no_result_and_releases() {
        let opener = Opener::new(true, true);
        let detector = CountingDetector::default();
        assert!(capture_and_detect(&opener, 0, &detector).unwrap().is_none());
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
        assert!(opener.released.load(Ordering::SeqCst));
    }
}
