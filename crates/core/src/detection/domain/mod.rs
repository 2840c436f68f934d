pub mod candidate_detector;
pub mod candidate_filter;
pub mod detection_error;
pub mod face_detector;
pub mod landmark_predictor;
pub mod landmark_set;
pub mod landmark_smile_detector;
pub mod mouth_geometry;
pub mod region_smile_detector;
pub mod smile_detector;
