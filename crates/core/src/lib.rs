//! Smile detection on camera frames and still images.
//!
//! Two interchangeable strategies sit behind [`SmileDetector`]: a region
//! strategy (face cascade plus smile-candidate gates) and a landmark
//! strategy (68-point mouth geometry). [`FrameSource`] keeps the newest
//! camera frame; the pipeline module drives live, single-shot and batch
//! detection on top of them.
//!
//! [`SmileDetector`]: detection::domain::smile_detector::SmileDetector
//! [`FrameSource`]: camera::frame_source::FrameSource

pub mod camera;
pub mod detection;
pub mod events;
pub mod pipeline;
pub mod shared;
pub mod video;
