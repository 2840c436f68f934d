use std::path::Path;
use std::sync::Mutex;

use image::GrayImage;

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;

use super::execution_provider::{load_session, square_input_size};

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// YOLO-face model run through `ort`. The grayscale frame is replicated
/// across the three input channels and letterboxed; output is filtered by
/// confidence and greedy NMS.
pub struct OnnxFaceDetector {
    session: Mutex<ort::session::Session>,
    confidence: f64,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Load a YOLO-face ONNX model. The input resolution is read from the
    /// model's NCHW input shape, falling back to 640.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        let input_size = square_input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        Ok(Self {
            session: Mutex::new(session),
            confidence,
            input_size,
        })
    }

    fn infer(&self, gray: &GrayImage) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
        let letterboxed = letterbox(gray, self.input_size);

        let input_value = ort::value::Tensor::from_array(letterboxed.tensor.clone())?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected face model output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        // [1, features, detections] when transposed, else [1, detections, features].
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };

        if num_feats < 5 {
            return Err(format!("Face model output has {num_feats} features, expected >= 5").into());
        }

        let mut dets = Vec::new();
        for i in 0..num_dets {
            let feat = |f: usize| {
                if transposed {
                    data[f * num_dets + i]
                } else {
                    data[i * num_feats + f]
                }
            };
            let confidence = feat(4) as f64;
            if confidence < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (feat(0) as f64, feat(1) as f64, feat(2) as f64, feat(3) as f64);
            dets.push(letterboxed.unmap(RawDetection {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
                confidence,
            }));
        }
        Ok(dets)
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<BoundingBox>, DetectionError> {
        if gray.width() == 0 || gray.height() == 0 {
            return Ok(Vec::new());
        }
        let mut dets = self
            .infer(gray)
            .map_err(|e| DetectionError::FaceDetector(e.to_string()))?;
        let kept = nms(&mut dets, NMS_IOU_THRESH);
        Ok(kept
            .iter()
            .filter_map(|d| d.to_box().clamp_to(gray.width(), gray.height()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

struct Letterboxed {
    tensor: ndarray::Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterboxed {
    /// Maps a detection from model input space back to image space.
    fn unmap(&self, d: RawDetection) -> RawDetection {
        let (px, py) = (self.pad_x as f64, self.pad_y as f64);
        RawDetection {
            x1: (d.x1 - px) / self.scale,
            y1: (d.y1 - py) / self.scale,
            x2: (d.x2 - px) / self.scale,
            y2: (d.y2 - py) / self.scale,
            confidence: d.confidence,
        }
    }
}

/// Letterbox-resize a grayscale image to `target_size` × `target_size`,
/// writing the intensity into all three channels.
fn letterbox(gray: &GrayImage, target_size: u32) -> Letterboxed {
    let (src_w, src_h) = gray.dimensions();
    let target = target_size as f64;

    let scale = (target / src_w as f64).min(target / src_h as f64);
    let new_w = ((src_w as f64 * scale).round() as u32).min(target_size);
    let new_h = ((src_h as f64 * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    // Nearest-neighbor resize into the padded region.
    for y in 0..new_h {
        let src_y = ((y as f64 / scale) as u32).min(src_h - 1);
        for x in 0..new_w {
            let src_x = ((x as f64 / scale) as u32).min(src_w - 1);
            let v = gray.get_pixel(src_x, src_y).0[0] as f32 / 255.0;
            let (ty, tx) = ((pad_y + y) as usize, (pad_x + x) as usize);
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = v;
            }
        }
    }

    Letterboxed {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

impl RawDetection {
    fn corners(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    fn to_box(&self) -> BoundingBox {
        let x = self.x1.round() as i32;
        let y = self.y1.round() as i32;
        BoundingBox::new(x, y, self.x2.round() as i32 - x, self.y2.round() as i32 - y)
    }
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RawDetection> = Vec::new();
    for det in dets.iter() {
        if keep
            .iter()
            .all(|k| bbox_iou(&k.corners(), &det.corners()) <= iou_thresh)
        {
            keep.push(det.clone());
        }
    }
    keep
}

/// IoU between two boxes represented as `[x1, y1, x2, y2]`.
fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}
