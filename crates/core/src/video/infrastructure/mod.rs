use std::sync::Arc;

use crate::video::domain::capture_device::CameraOpener;

pub mod image_file_reader;
pub mod image_file_writer;
pub mod jpeg_encoder;
#[cfg(feature = "opencv")]
pub mod opencv_camera;
pub mod unavailable_camera;

/// The camera backend compiled into this build.
pub fn default_camera_opener() -> Arc<dyn CameraOpener> {
    #[cfg(feature = "opencv")]
    {
        Arc::new(opencv_camera::OpenCvCameraOpener)
    }
    #[cfg(not(feature = "opencv"))]
    {
        Arc::new(unavailable_camera::UnavailableCameraOpener)
    }
}
