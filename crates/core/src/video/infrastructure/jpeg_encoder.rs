use crate::shared::constants::JPEG_QUALITY;
use crate::shared::frame::Frame;
use crate::video::domain::image_encoder::{EncodeError, ImageEncoder};

/// Encodes RGB frames as baseline JPEG using the `image` crate.
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    /// Quality in `1..=100`; out-of-range values are clamped.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(reason: impl ToString) -> EncodeError {
    EncodeError {
        format: "jpeg",
        reason: reason.to_string(),
    }
}

impl ImageEncoder for JpegEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(encode_error("frame has zero size"));
        }

        let mut buf = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.quality);
        encoder.encode_image(frame.image()).map_err(encode_error)?;
        Ok(buf)
    }
}
