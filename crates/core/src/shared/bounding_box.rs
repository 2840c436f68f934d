use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer pixels, origin at the top-left.
///
/// Boxes handed to callers are always frame-absolute; detector primitives
/// reuse the type for their raw output in whatever image they scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// True when the box has positive extent and a non-negative origin.
    pub fn is_valid(&self) -> bool {
        self.w > 0 && self.h > 0 && self.x >= 0 && self.y >= 0
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Width over height; 0.0 for a degenerate height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.h <= 0 {
            return 0.0;
        }
        self.w as f64 / self.h as f64
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Intersection with a `width` × `height` image, `None` if nothing remains.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.w).min(width as i32);
        let y2 = (self.y + self.h).min(height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Smallest upright box containing every point, counting pixels
    /// inclusively: points spanning columns 3..=7 give `w == 5`.
    pub fn enclosing(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let x = min_x.floor() as i32;
        let y = min_y.floor() as i32;
        Some(Self::new(
            x,
            y,
            max_x.floor() as i32 - x + 1,
            max_y.floor() as i32 - y + 1,
        ))
    }
}
