use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::{GrayImage, Rgb, RgbImage};
use tempfile::TempDir;

use smileguard_core::detection::domain::detection_error::DetectionError;
use smileguard_core::detection::domain::face_detector::FaceDetector;
use smileguard_core::detection::domain::landmark_predictor::LandmarkPredictor;
use smileguard_core::detection::domain::landmark_set::{LandmarkSet, LANDMARK_COUNT};
use smileguard_core::detection::domain::landmark_smile_detector::LandmarkSmileDetector;
use smileguard_core::detection::domain::mouth_geometry::SmileThresholds;
use smileguard_core::pipeline::batch_use_case::{BatchSmileUseCase, NO_SMILE_DIR, SMILE_DIR};
use smileguard_core::shared::bounding_box::BoundingBox;
use smileguard_core::video::infrastructure::image_file_reader::ImageFileReader;
use smileguard_core::video::infrastructure::image_file_writer::ImageFileWriter;
use smileguard_core::video::infrastructure::jpeg_encoder::JpegEncoder;

const FACE: BoundingBox = BoundingBox::new(10, 10, 40, 40);

/// Finds one face whenever the image is not dark.
struct BrightFace;

impl FaceDetector for BrightFace {
    fn detect_faces(&self, image: &GrayImage) -> Result<Vec<BoundingBox>, DetectionError> {
        if image.get_pixel(0, 0).0[0] > 64 {
            Ok(vec![FACE])
        } else {
            Ok(vec![])
        }
    }
}

/// Open, upturned mouth when the pixel at the face origin is very bright,
/// closed flat mouth otherwise.
struct BrightnessMouth;

impl LandmarkPredictor for BrightnessMouth {
    fn predict(&self, image: &GrayImage, face: &BoundingBox) -> Result<LandmarkSet, DetectionError> {
        let bright = image.get_pixel(face.x as u32, face.y as u32).0[0] > 200;
        let mut pts = [(30.0, 40.0); LANDMARK_COUNT];
        pts[48] = (20.0, 40.0);
        pts[54] = (40.0, 40.0);
        if bright {
            pts[51] = (30.0, 34.0);
            pts[57] = (30.0, 44.0);
            pts[62] = (30.0, 36.0);
            pts[66] = (30.0, 43.0);
        } else {
            pts[51] = (30.0, 40.0);
            pts[57] = (30.0, 41.0);
            pts[62] = (30.0, 40.0);
            pts[66] = (30.0, 41.0);
        }
        Ok(LandmarkSet::new(pts))
    }
}

fn save_solid(path: &Path, value: u8) {
    RgbImage::from_pixel(60, 60, Rgb([value; 3])).save(path).unwrap();
}

fn use_case() -> BatchSmileUseCase {
    let detector = LandmarkSmileDetector::new(
        Arc::new(BrightFace),
        Arc::new(BrightnessMouth),
        Arc::new(JpegEncoder::new()),
        SmileThresholds::default(),
    );
    BatchSmileUseCase::new(
        Arc::new(ImageFileReader::new()),
        Arc::new(detector),
        Arc::new(ImageFileWriter::new()),
        None,
    )
}

#[test]
fn test_batch_sorts_images_by_smile() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    fs::create_dir_all(&input).unwrap();

    save_solid(&input.join("beaming.png"), 250);
    save_solid(&input.join("neutral.png"), 150);
    save_solid(&input.join("nobody.jpg"), 10);
    fs::write(input.join("notes.txt"), "not an image").unwrap();

    let summary = use_case().execute(&input, &output).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.smiles, 1);
    assert_eq!(summary.failed, 0);

    let smile = output.join(SMILE_DIR).join("beaming.png.jpg");
    let decoded = image::open(&smile).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (60, 60));

    let no_smile = output.join(NO_SMILE_DIR);
    assert_eq!(
        fs::read(no_smile.join("neutral.png")).unwrap(),
        fs::read(input.join("neutral.png")).unwrap()
    );
    assert!(no_smile.join("nobody.jpg").exists());
    assert!(!no_smile.join("notes.txt").exists());
}

#[test]
fn test_batch_routes_corrupt_files_to_no_smile() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    fs::create_dir_all(&input).unwrap();

    fs::write(input.join("broken.jpg"), b"definitely not a jpeg").unwrap();
    save_solid(&input.join("fine.png"), 250);

    let summary = use_case().execute(&input, &output).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.smiles, 1);
    assert_eq!(summary.failed, 1);
    assert!(output.join(NO_SMILE_DIR).join("broken.jpg").exists());
}

#[test]
fn test_batch_on_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let summary = use_case().execute(tmp.path(), &tmp.path().join("out")).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.smiles, 0);
}
