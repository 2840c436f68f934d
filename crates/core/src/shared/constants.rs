pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";
pub const DEFAULT_FACE_CONFIDENCE: f64 = 0.5;

/// 68-point landmark regression model. No public download location is
/// assumed; the file must be placed in the model cache or bundled dir.
pub const LANDMARK_MODEL_NAME: &str = "face_landmarks_68.onnx";

pub const FACE_CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";
pub const SMILE_CASCADE_FILE: &str = "haarcascade_smile.xml";
pub const DEFAULT_CASCADE_DIR: &str = "/usr/share/opencv4/haarcascades";

pub const DEFAULT_DEVICE_INDEX: i32 = 0;

/// Delay between capture reads (~30 frames per second).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

pub const DEFAULT_EVENT_LOG: &str = "smiles.jsonl";
pub const DEFAULT_IMAGE_DIR: &str = "detected_smiles";
pub const EVENT_LOG_ENV: &str = "SMILE_LOG_PATH";
pub const IMAGE_DIR_ENV: &str = "DETECTION_IMAGE_DIR";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub const JPEG_QUALITY: u8 = 90;
