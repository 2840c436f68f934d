use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const LANDMARK_COLOR: [u8; 3] = [255, 0, 0];
pub const BOX_THICKNESS: i32 = 2;

/// Hollow rectangle whose outer edge is `b`, drawn as `thickness` nested
/// one-pixel outlines. Parts outside the frame are clipped.
pub fn draw_rectangle(frame: &mut Frame, b: &BoundingBox, color: [u8; 3], thickness: i32) {
    for k in 0..thickness.max(1) {
        let (w, h) = (b.w - 2 * k, b.h - 2 * k);
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(b.x + k, b.y + k).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(frame.image_mut(), rect, Rgb(color));
    }
}

/// Filled dot centered on `(x, y)`.
pub fn draw_dot(frame: &mut Frame, x: f64, y: f64, radius: i32, color: [u8; 3]) {
    let center = (x.round() as i32, y.round() as i32);
    draw_filled_circle_mut(frame.image_mut(), center, radius, Rgb(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_marks_border_only() {
        let mut frame = Frame::filled(20, 20, [0; 3]);
        draw_rectangle(&mut frame, &BoundingBox::new(5, 5, 10, 8), BOX_COLOR, 2);

        assert_eq!(frame.pixel(5, 5), BOX_COLOR);
        assert_eq!(frame.pixel(14, 12), BOX_COLOR);
        assert_eq!(frame.pixel(6, 6), BOX_COLOR); // second ring
        assert_eq!(frame.pixel(9, 9), [0; 3]); // interior
        assert_eq!(frame.pixel(4, 4), [0; 3]); // outside
        assert_eq!(frame.pixel(15, 13), [0; 3]);
    }

    #[test]
    fn test_rectangle_clips_at_frame_edge() {
        let mut frame = Frame::filled(10, 10, [0; 3]);
        draw_rectangle(&mut frame, &BoundingBox::new(-3, -3, 8, 8), BOX_COLOR, 1);
        assert_eq!(frame.pixel(4, 0), BOX_COLOR);
        assert_eq!(frame.pixel(0, 4), BOX_COLOR);
        assert_eq!(frame.pixel(2, 2), [0; 3]);
    }

    #[test]
    fn test_degenerate_rectangle_draws_nothing() {
        let mut frame = Frame::filled(10, 10, [0; 3]);
        draw_rectangle(&mut frame, &BoundingBox::new(2, 2, 0, 5), BOX_COLOR, 2);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_thickness_larger_than_box_stops_at_center() {
        let mut frame = Frame::filled(10, 10, [0; 3]);
        draw_rectangle(&mut frame, &BoundingBox::new(2, 2, 3, 3), BOX_COLOR, 5);
        assert_eq!(frame.pixel(3, 3), BOX_COLOR);
        assert_eq!(frame.pixel(5, 5), [0; 3]);
    }

    #[test]
    fn test_dot_is_centered_on_rounded_point() {
        let mut frame = Frame::filled(10, 10, [0; 3]);
        draw_dot(&mut frame, 4.4, 5.0, 1, LANDMARK_COLOR);
        for (x, y) in [(4, 5), (3, 5), (5, 5), (4, 4), (4, 6)] {
            assert_eq!(frame.pixel(x, y), LANDMARK_COLOR, "({x}, {y})");
        }
        assert_eq!(frame.pixel(6, 5), [0; 3]);
        assert_eq!(frame.pixel(4, 7), [0; 3]);
    }
}
