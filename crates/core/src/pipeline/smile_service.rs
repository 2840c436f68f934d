use std::sync::Arc;

use thiserror::Error;

use crate::camera::frame_source::{CameraError, FrameSource};
use crate::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use crate::events::domain::event_sink::EventSink;

/// Outcome classes surfaced to whatever boundary drives the service.
/// Messages are generic; details go to the log.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

/// Live-camera session: camera lifecycle plus detection on the most recent
/// frame, with accepted detections forwarded to an event sink.
pub struct SmileService {
    frames: Arc<FrameSource>,
    detector: Arc<dyn SmileDetector>,
    sink: Arc<dyn EventSink>,
}

impl SmileService {
    pub fn new(
        frames: Arc<FrameSource>,
        detector: Arc<dyn SmileDetector>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            frames,
            detector,
            sink,
        }
    }

    pub fn start_camera(&self) -> Result<(), ServiceError> {
        self.frames.start().map_err(|e| match e {
            CameraError::AlreadyRunning => ServiceError::Conflict("Camera already running".into()),
            other => {
                log::error!("Camera start failed: {other}");
                ServiceError::Internal("Failed to start camera".into())
            }
        })
    }

    pub fn stop_camera(&self) -> Result<(), ServiceError> {
        self.frames.stop().map_err(|e| match e {
            CameraError::AlreadyStopped => ServiceError::Conflict("Camera already stopped".into()),
            other => {
                log::error!("Camera stop failed: {other}");
                ServiceError::Internal("Unexpected error while stopping camera".into())
            }
        })
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    /// Runs detection on the latest frame.
    ///
    /// `Ok(None)` covers both "no frame captured yet" and "no smile".
    /// Persistence failures are logged and do not affect the result.
    pub fn detect_smile(&self) -> Result<Option<SmileDetection>, ServiceError> {
        if !self.frames.is_running() {
            return Err(ServiceError::Conflict("Camera not started".into()));
        }

        let frame = self.frames.latest_frame();
        let detection = self
            .detector
            .detect_optional(frame.as_ref())
            .map_err(|e| {
                log::error!("Smile detection failed: {e}");
                ServiceError::Internal("Unexpected error during detection".into())
            })?;

        if let Some(ref d) = detection {
            self.persist(d);
        }
        Ok(detection)
    }

    /// Stops the camera if it is still running. Safe to call repeatedly.
    pub fn shutdown(&self) {
        if self.frames.is_running() {
            if let Err(e) = self.frames.stop() {
                log::warn!("Camera stop during shutdown: {e}");
            }
        }
    }

    fn persist(&self, detection: &SmileDetection) {
        if let Err(e) = self.sink.log_detection(&detection.boxes) {
            log::error!("Failed to log detection event: {e}");
        }
        if let Err(e) = self.sink.save_image(&detection.image) {
            log::error!("Failed to save detection image: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use crate::detection::domain::detection_error::SmileError;
    use crate::events::domain::event_sink::SinkError;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;
    use crate::video::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
    use crate::video::domain::image_encoder::EncodeError;

    // --- Fakes ---

    struct SolidCamera;

    impl CaptureDevice for SolidCamera {
        fn read(&mut self) -> Result<Frame, CaptureError> {
            Ok(Frame::filled(8, 8, [90; 3]))
        }
        fn release(&mut self) {}
    }

    struct FakeOpener {
        available: bool,
    }

    impl CameraOpener for FakeOpener {
        fn open(&self, index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
            if self.available {
                Ok(Box::new(SolidCamera))
            } else {
                Err(CaptureError::Open {
                    index,
                    reason: "busy".into(),
                })
            }
        }
    }

    enum Reply {
        Smile,
        Nothing,
        EncodeFails,
    }

    struct ScriptedDetector {
        reply: Reply,
        saw_frame: AtomicBool,
    }

    impl SmileDetector for ScriptedDetector {
        fn detect(&self, _frame: &Frame) -> Result<Option<SmileDetection>, SmileError> {
            self.saw_frame.store(true, Ordering::SeqCst);
            match self.reply {
                Reply::Smile => Ok(Some(SmileDetection {
                    image: vec![0xFF, 0xD8],
                    boxes: vec![BoundingBox::new(30, 70, 50, 20)],
                })),
                Reply::Nothing => Ok(None),
                Reply::EncodeFails => Err(EncodeError {
                    format: "jpeg",
                    reason: "disk on fire".into(),
                }
                .into()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        logged: Mutex<Vec<Vec<BoundingBox>>>,
        images: AtomicUsize,
    }

    impl EventSink for RecordingSink {
        fn log_detection(&self, boxes: &[BoundingBox]) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Io {
                    path: PathBuf::from("smiles.jsonl"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "read-only"),
                });
            }
            self.logged.lock().unwrap().push(boxes.to_vec());
            Ok(())
        }

        fn save_image(&self, _bytes: &[u8]) -> Result<Option<PathBuf>, SinkError> {
            self.images.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    // --- Helpers ---

    fn service(
        available: bool,
        reply: Reply,
        sink: Arc<RecordingSink>,
    ) -> (SmileService, Arc<ScriptedDetector>) {
        let frames = Arc::new(FrameSource::new(
            Arc::new(FakeOpener { available }),
            0,
            Duration::from_millis(1),
        ));
        let detector = Arc::new(ScriptedDetector {
            reply,
            saw_frame: AtomicBool::new(false),
        });
        (SmileService::new(frames, detector.clone(), sink), detector)
    }

    fn wait_for_frame(svc: &SmileService) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while svc.frames.latest_frame().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    // --- Tests ---

    #[test]
    fn test_start_stop_conflicts() {
        let (svc, _) = service(true, Reply::Nothing, Arc::default());
        assert_eq!(svc.start_camera(), Ok(()));
        assert_eq!(
            svc.start_camera(),
            Err(ServiceError::Conflict("Camera already running".into()))
        );
        assert_eq!(svc.stop_camera(), Ok(()));
        assert_eq!(
            svc.stop_camera(),
            Err(ServiceError::Conflict("Camera already stopped".into()))
        );
    }

    #[test]
    fn test_start_with_unavailable_device_is_internal() {
        let (svc, _) = service(false, Reply::Nothing, Arc::default());
        assert!(matches!(svc.start_camera(), Err(ServiceError::Internal(_))));
        assert!(!svc.is_running());
    }

    #[test]
    fn test_detect_before_start_is_conflict() {
        let (svc, detector) = service(true, Reply::Smile, Arc::default());
        assert_eq!(
            svc.detect_smile(),
            Err(ServiceError::Conflict("Camera not started".into()))
        );
        assert!(!detector.saw_frame.load(Ordering::SeqCst));
    }

    #[test]
    fn test_detection_is_persisted() {
        let sink = Arc::new(RecordingSink::default());
        let (svc, _) = service(true, Reply::Smile, sink.clone());
        svc.start_camera().unwrap();
        wait_for_frame(&svc);

        let result = svc.detect_smile().unwrap().unwrap();
        assert_eq!(result.boxes, vec![BoundingBox::new(30, 70, 50, 20)]);
        assert_eq!(
            *sink.logged.lock().unwrap(),
            vec![vec![BoundingBox::new(30, 70, 50, 20)]]
        );
        assert_eq!(sink.images.load(Ordering::SeqCst), 1);
        svc.shutdown();
    }

    #[test]
    fn test_no_smile_persists_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let (svc, _) = service(true, Reply::Nothing, sink.clone());
        svc.start_camera().unwrap();
        wait_for_frame(&svc);

        assert_eq!(svc.detect_smile(), Ok(None));
        assert!(sink.logged.lock().unwrap().is_empty());
        assert_eq!(sink.images.load(Ordering::SeqCst), 0);
        svc.shutdown();
    }

    #[test]
    fn test_sink_failure_does_not_fail_request() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let (svc, _) = service(true, Reply::Smile, sink.clone());
        svc.start_camera().unwrap();
        wait_for_frame(&svc);

        assert!(svc.detect_smile().unwrap().is_some());
        // Image save is still attempted after the log write fails.
        assert_eq!(sink.images.load(Ordering::SeqCst), 1);
        svc.shutdown();
    }

    #[test]
    fn test_encode_failure_is_internal_not_empty() {
        let (svc, _) = service(true, Reply::EncodeFails, Arc::default());
        svc.start_camera().unwrap();
        wait_for_frame(&svc);

        assert_eq!(
            svc.detect_smile(),
            Err(ServiceError::Internal(
                "Unexpected error during detection".into()
            ))
        );
        svc.shutdown();
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (svc, _) = service(true, Reply::Nothing, Arc::default());
        svc.shutdown();
        svc.start_camera().unwrap();
        svc.shutdown();
        svc.shutdown();
        assert!(!svc.is_running());
    }
}
