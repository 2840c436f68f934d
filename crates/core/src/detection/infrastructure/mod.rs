pub mod detector_factory;
pub mod execution_provider;
pub mod model_resolver;
pub mod onnx_face_detector;
pub mod onnx_landmark_predictor;
#[cfg(feature = "opencv")]
pub mod opencv_cascade;
