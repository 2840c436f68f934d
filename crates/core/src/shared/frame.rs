use image::{GrayImage, Rgb, RgbImage};

/// A single camera/image frame: contiguous RGB bytes in row-major order.
///
/// Channel order is RGB everywhere in the crate; capture adapters convert
/// at the I/O boundary. `sequence` counts capture ticks for the source that
/// produced the frame (0 for frames loaded from disk).
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    image: RgbImage,
    sequence: u64,
}

pub const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        let image = RgbImage::from_raw(width, height, data)
            .unwrap_or_else(|| RgbImage::new(width, height));
        Self { image, sequence }
    }

    /// Uniformly colored frame, mostly useful for tests and placeholders.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_rgb_image(RgbImage::from_pixel(width, height, Rgb(rgb)), 0)
    }

    pub fn from_rgb_image(image: RgbImage, sequence: u64) -> Self {
        Self { image, sequence }
    }

    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Single-channel intensity, with the `image` crate's luma weights.
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }
}
