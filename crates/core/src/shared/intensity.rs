use image::GrayImage;

use crate::shared::bounding_box::BoundingBox;

/// Global histogram equalization over the whole image.
pub fn equalize_histogram(img: &GrayImage) -> GrayImage {
    imageproc::contrast::equalize_histogram(img)
}

/// Copies the part of `img` covered by `area`, clamped to the image.
/// Returns `None` when nothing of the area lies inside the image.
pub fn crop(img: &GrayImage, area: &BoundingBox) -> Option<GrayImage> {
    let clamped = area.clamp_to(img.width(), img.height())?;
    Some(
        image::imageops::crop_imm(
            img,
            clamped.x as u32,
            clamped.y as u32,
            clamped.w as u32,
            clamped.h as u32,
        )
        .to_image(),
    )
}
