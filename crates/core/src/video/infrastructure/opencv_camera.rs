use opencv::core::Mat;
use opencv::imgproc::{cvt_color_def, COLOR_BGR2RGB};
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY};

use crate::shared::frame::Frame;
use crate::video::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};

/// Opens OpenCV capture devices by index.
pub struct OpenCvCameraOpener;

impl CameraOpener for OpenCvCameraOpener {
    fn open(&self, index: i32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        let open_error = |reason: String| CaptureError::Open { index, reason };

        let capture =
            VideoCapture::new(index, CAP_ANY).map_err(|e| open_error(e.to_string()))?;
        if !capture.is_opened().map_err(|e| open_error(e.to_string()))? {
            return Err(open_error("device is not available".into()));
        }
        log::debug!("Opened capture device {index}");
        Ok(Box::new(OpenCvCamera { capture, index }))
    }
}

/// An open webcam. Frames come out of OpenCV as BGR and are converted to
/// RGB before leaving this type.
pub struct OpenCvCamera {
    capture: VideoCapture,
    index: i32,
}

impl CaptureDevice for OpenCvCamera {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        let mut bgr = Mat::default();
        let ok = self
            .capture
            .read(&mut bgr)
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        if !ok || bgr.empty() {
            return Err(CaptureError::Read(format!(
                "device {} returned an empty frame",
                self.index
            )));
        }

        let mut rgb = Mat::default();
        cvt_color_def(&bgr, &mut rgb, COLOR_BGR2RGB)
            .map_err(|e| CaptureError::Read(e.to_string()))?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb
            .data_bytes()
            .map_err(|e| CaptureError::Read(e.to_string()))?
            .to_vec();
        Ok(Frame::new(data, width, height, 0))
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release capture device {}: {e}", self.index);
        }
    }
}
