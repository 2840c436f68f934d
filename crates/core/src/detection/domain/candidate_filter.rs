use serde::{Deserialize, Serialize};

use crate::detection::domain::candidate_detector::ScanParams;
use crate::shared::bounding_box::BoundingBox;

/// Which part of a face box is scanned for smile candidates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchArea {
    /// Scan the whole face, then keep candidates whose vertical center lies
    /// below `min_center_fraction` of the face height.
    FullFace { min_center_fraction: f64 },
    /// Scan only the face below `start_fraction` of its height, which keeps
    /// eyes and brows out of the search.
    LowerFace { start_fraction: f64 },
}

impl SearchArea {
    /// Part of `face` to scan, in the same coordinates as `face`.
    pub fn region_of(&self, face: &BoundingBox) -> BoundingBox {
        match *self {
            SearchArea::FullFace { .. } => *face,
            SearchArea::LowerFace { start_fraction } => {
                let start = (face.h as f64 * start_fraction) as i32;
                BoundingBox::new(face.x, face.y + start, face.w, face.h - start)
            }
        }
    }

    /// Positional gate for a candidate given in face-local coordinates.
    fn admits(&self, face: &BoundingBox, candidate: &BoundingBox) -> bool {
        match *self {
            SearchArea::FullFace {
                min_center_fraction,
            } => candidate.center_y() > (face.h as f64 * min_center_fraction) as i32,
            SearchArea::LowerFace { .. } => true,
        }
    }
}

/// Tunables of the region (cascade) strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionHeuristics {
    pub smile_scan: ScanParams,
    /// Candidates must be strictly wider than this multiple of their height.
    pub min_aspect_ratio: f64,
    pub search_area: SearchArea,
    pub equalize_histogram: bool,
}

impl Default for RegionHeuristics {
    fn default() -> Self {
        Self {
            smile_scan: ScanParams::new(1.3, 12, 22),
            min_aspect_ratio: 1.8,
            search_area: SearchArea::FullFace {
                min_center_fraction: 0.6,
            },
            equalize_histogram: true,
        }
    }
}

impl RegionHeuristics {
    /// Picks the largest candidate passing the aspect and position gates.
    ///
    /// `candidates` are face-local; ties on area keep the earlier one.
    pub fn select_best(
        &self,
        face: &BoundingBox,
        candidates: &[BoundingBox],
    ) -> Option<BoundingBox> {
        let mut best: Option<BoundingBox> = None;
        for c in candidates {
            if c.aspect_ratio() <= self.min_aspect_ratio {
                continue;
            }
            if !self.search_area.admits(face, c) {
                continue;
            }
            if best.map_or(true, |b| c.area() > b.area()) {
                best = Some(*c);
            }
        }
        best
    }
}
