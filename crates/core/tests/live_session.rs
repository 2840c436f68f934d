use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::GrayImage;
use tempfile::TempDir;

use smileguard_core::camera::frame_source::FrameSource;
use smileguard_core::detection::domain::candidate_detector::{CandidateDetector, ScanParams};
use smileguard_core::detection::domain::candidate_filter::RegionHeuristics;
use smileguard_core::detection::domain::detection_error::DetectionError;
use smileguard_core::detection::domain::face_detector::FaceDetector;
use smileguard_core::detection::domain::region_smile_detector::RegionSmileDetector;
use smileguard_core::detection::domain::smile_detector::SmileDetector;
use smileguard_core::events::domain::event_sink::DetectionEvent;
use smileguard_core::events::infrastructure::file_event_sink::FileEventSink;
use smileguard_core::pipeline::single_shot::capture_and_detect;
use smileguard_core::pipeline::smile_service::{ServiceError, SmileService};
use smileguard_core::shared::bounding_box::BoundingBox;
use smileguard_core::shared::frame::Frame;
use smileguard_core::video::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
use smileguard_core::video::infrastructure::jpeg_encoder::JpegEncoder;

const FACE: BoundingBox = BoundingBox::new(40, 40, 100, 100);
/// Face-local; wide and low enough to pass the default region gates.
const MOUTH: BoundingBox = BoundingBox::new(20, 70, 60, 20);

struct OneFace;

impl FaceDetector for OneFace {
    fn detect_faces(&self, _image: &GrayImage) -> Result<Vec<BoundingBox>, DetectionError> {
        Ok(vec![FACE])
    }
}

struct OneMouth;

impl CandidateDetector for OneMouth {
    fn detect_candidates(
        &self,
        _image: &GrayImage,
        _params: &ScanParams,
    ) -> Result<Vec<BoundingBox>, DetectionError> {
        Ok(vec![MOUTH])
    }
}

struct StillCamera;

impl CaptureDevice for StillCamera {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        Ok(Frame::filled(200, 200, [90, 120, 150]))
    }

    fn release(&mut self) {}
}

struct StillOpener;

impl CameraOpener for StillOpener {
    fn open(&self, _index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Ok(Box::new(StillCamera))
    }
}

struct MissingOpener;

impl CameraOpener for MissingOpener {
    fn open(&self, index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Err(CaptureError::Open {
            index,
            reason: "no such device".into(),
        })
    }
}

fn region_detector() -> Arc<dyn SmileDetector> {
    Arc::new(RegionSmileDetector::new(
        Arc::new(OneFace),
        Arc::new(OneMouth),
        Arc::new(JpegEncoder::new()),
        RegionHeuristics::default(),
    ))
}

fn wait_for_frame(frames: &FrameSource) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while frames.latest_frame().is_none() {
        assert!(Instant::now() < deadline, "no frame captured in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_live_session_persists_detection() {
    let tmp = TempDir::new().unwrap();
    let log_path = tmp.path().join("events").join("smiles.jsonl");
    let image_dir = tmp.path().join("images");

    let frames = Arc::new(FrameSource::new(
        Arc::new(StillOpener),
        0,
        Duration::from_millis(1),
    ));
    let sink = Arc::new(FileEventSink::new(&log_path, &image_dir));
    let service = SmileService::new(frames.clone(), region_detector(), sink);

    assert_eq!(
        service.detect_smile(),
        Err(ServiceError::Conflict("Camera not started".into()))
    );

    service.start_camera().unwrap();
    wait_for_frame(&frames);

    let detection = service.detect_smile().unwrap().unwrap();
    assert_eq!(detection.boxes, vec![BoundingBox::new(60, 110, 60, 20)]);
    assert!(detection.image.starts_with(&[0xFF, 0xD8]));

    let events: Vec<DetectionEvent> = fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].coords, detection.boxes);

    let saved: Vec<_> = fs::read_dir(&image_dir).unwrap().collect();
    assert_eq!(saved.len(), 1);

    service.stop_camera().unwrap();
    assert_eq!(
        service.stop_camera(),
        Err(ServiceError::Conflict("Camera already stopped".into()))
    );
    assert!(frames.latest_frame().is_none());
}

#[test]
fn test_annotated_image_decodes_with_frame_size() {
    let detector = region_detector();
    let detection = detector
        .detect(&Frame::filled(200, 200, [90, 120, 150]))
        .unwrap()
        .unwrap();

    let decoded = image::load_from_memory(&detection.image).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 200));
}

#[test]
fn test_snapshot_with_and_without_camera() {
    let detector = region_detector();

    let found = capture_and_detect(&StillOpener, 0, detector.as_ref()).unwrap();
    assert!(found.is_some());

    let missing = capture_and_detect(&MissingOpener, 0, detector.as_ref()).unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_start_fails_when_camera_missing() {
    let frames = Arc::new(FrameSource::new(
        Arc::new(MissingOpener),
        3,
        Duration::from_millis(1),
    ));
    let service = SmileService::new(
        frames,
        region_detector(),
        Arc::new(smileguard_core::events::domain::event_sink::NullEventSink),
    );

    assert_eq!(
        service.start_camera(),
        Err(ServiceError::Internal("Failed to start camera".into()))
    );
    assert!(!service.is_running());
}
