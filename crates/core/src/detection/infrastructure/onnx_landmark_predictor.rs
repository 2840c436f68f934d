use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::GrayImage;

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::detection::domain::landmark_set::{LandmarkSet, LANDMARK_COUNT};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::intensity::crop;

use super::execution_provider::{load_session, square_input_size};

/// Crop side length when the model does not declare one.
const DEFAULT_INPUT_SIZE: u32 = 112;

/// Expects a model taking `[1, 3, S, S]` floats in `[0, 1]` and producing
/// `2 * 68` values: interleaved x/y normalized to the crop.
pub struct OnnxLandmarkPredictor {
    session: Mutex<ort::session::Session>,
    input_size: u32,
}

impl OnnxLandmarkPredictor {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        let input_size = square_input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        Ok(Self {
            session: Mutex::new(session),
            input_size,
        })
    }

    fn infer(&self, patch: &GrayImage) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let tensor = preprocess(patch, self.input_size);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("landmark model produced no outputs".into());
        }
        let values = outputs[0].try_extract_array::<f32>()?;
        Ok(values.iter().copied().collect())
    }
}

impl LandmarkPredictor for OnnxLandmarkPredictor {
    fn predict(&self, image: &GrayImage, face: &BoundingBox) -> Result<LandmarkSet, DetectionError> {
        let area = face
            .clamp_to(image.width(), image.height())
            .ok_or_else(|| DetectionError::LandmarkPredictor("face lies outside the image".into()))?;
        let patch = crop(image, &area)
            .ok_or_else(|| DetectionError::LandmarkPredictor("empty face crop".into()))?;

        let values = self
            .infer(&patch)
            .map_err(|e| DetectionError::LandmarkPredictor(e.to_string()))?;
        decode(&values, &area)
    }
}

/// Resizes the crop to `size` × `size` and replicates it into an NCHW
/// tensor scaled to `[0, 1]`.
fn preprocess(patch: &GrayImage, size: u32) -> ndarray::Array4<f32> {
    let resized = image::imageops::resize(patch, size, size, FilterType::Triangle);
    let s = size as usize;
    ndarray::Array4::from_shape_fn((1, 3, s, s), |(_, _, y, x)| {
        resized.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    })
}

/// Maps crop-normalized `[x0, y0, x1, y1, ...]` back into image coordinates.
fn decode(values: &[f32], area: &BoundingBox) -> Result<LandmarkSet, DetectionError> {
    if values.len() != LANDMARK_COUNT * 2 {
        return Err(DetectionError::LandmarkCount {
            expected: LANDMARK_COUNT,
            actual: values.len() / 2,
        });
    }
    let points: Vec<(f64, f64)> = values
        .chunks_exact(2)
        .map(|xy| {
            (
                area.x as f64 + xy[0] as f64 * area.w as f64,
                area.y as f64 + xy[1] as f64 * area.h as f64,
            )
        })
        .collect();
    LandmarkSet::from_points(&points)
}
