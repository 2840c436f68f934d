use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::detection::domain::landmark_smile_detector::LandmarkSmileDetector;
use crate::detection::domain::smile_detector::SmileDetector;
use crate::shared::config::{SmileGuardConfig, Strategy};
use crate::video::domain::image_encoder::ImageEncoder;
use crate::video::infrastructure::jpeg_encoder::JpegEncoder;

use super::model_resolver::{self, ModelSource};
use super::onnx_face_detector::OnnxFaceDetector;
use super::onnx_landmark_predictor::OnnxLandmarkPredictor;

/// Builds the configured strategy with its production primitives.
///
/// The region strategy needs Haar cascades and is only available when the
/// crate is built with the `opencv` feature. `on_download` receives
/// `(bytes_downloaded, total_bytes)` while a missing model is fetched.
pub fn create_smile_detector(
    config: &SmileGuardConfig,
    strategy: Strategy,
    on_download: Option<fn(u64, u64)>,
) -> Result<Arc<dyn SmileDetector>, Box<dyn std::error::Error>> {
    let encoder: Arc<dyn ImageEncoder> = Arc::new(JpegEncoder::new());
    log::info!("Using {strategy} smile detection");
    match strategy {
        Strategy::Region => create_region_detector(config, encoder),
        Strategy::Landmark => create_landmark_detector(config, encoder, on_download),
    }
}

#[cfg(feature = "opencv")]
fn create_region_detector(
    config: &SmileGuardConfig,
    encoder: Arc<dyn ImageEncoder>,
) -> Result<Arc<dyn SmileDetector>, Box<dyn std::error::Error>> {
    use crate::detection::domain::region_smile_detector::RegionSmileDetector;

    use super::opencv_cascade::{CascadeFaceDetector, OpenCvCascade};

    let models = &config.models;
    let faces = CascadeFaceDetector::new(
        OpenCvCascade::load(&models.face_cascade_path())?,
        config.region.face_scan,
    );
    let smiles = OpenCvCascade::load(&models.smile_cascade_path())?;
    Ok(Arc::new(RegionSmileDetector::new(
        Arc::new(faces),
        Arc::new(smiles),
        encoder,
        config.region.heuristics,
    )))
}

#[cfg(not(feature = "opencv"))]
fn create_region_detector(
    _config: &SmileGuardConfig,
    _encoder: Arc<dyn ImageEncoder>,
) -> Result<Arc<dyn SmileDetector>, Box<dyn std::error::Error>> {
    Err("the region strategy requires a build with the `opencv` feature".into())
}

fn create_landmark_detector(
    config: &SmileGuardConfig,
    encoder: Arc<dyn ImageEncoder>,
    on_download: Option<fn(u64, u64)>,
) -> Result<Arc<dyn SmileDetector>, Box<dyn std::error::Error>> {
    let models = &config.models;
    let bundled = models.bundled_dir.as_deref();

    let face_path = resolve_model(
        ModelSource {
            name: &models.face_model,
            url: models.face_model_url.as_deref(),
        },
        bundled,
        on_download,
    )?;
    let landmark_path = resolve_model(
        ModelSource {
            name: &models.landmark_model,
            url: models.landmark_model_url.as_deref(),
        },
        bundled,
        on_download,
    )?;

    let faces = OnnxFaceDetector::new(&face_path, models.face_confidence)?;
    let landmarks = OnnxLandmarkPredictor::new(&landmark_path)?;
    Ok(Arc::new(LandmarkSmileDetector::new(
        Arc::new(faces),
        Arc::new(landmarks),
        encoder,
        config.landmark,
    )))
}

fn resolve_model(
    source: ModelSource<'_>,
    bundled: Option<&Path>,
    on_download: Option<fn(u64, u64)>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {}", source.name);
    let progress = on_download.map(|f| Box::new(f) as model_resolver::ProgressFn);
    Ok(model_resolver::resolve(source, bundled, progress)?)
}
