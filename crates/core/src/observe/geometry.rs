use reveal_protocol::Rect;

use super::margin::RootMargin;
use super::options::Threshold;

/// How much of a target lies inside the margin-adjusted root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Visible fraction of the target's area, `0.0..=1.0`.
    pub ratio: f64,
    /// The target overlaps or touches the root.
    pub is_intersecting: bool,
}

impl Intersection {
    pub const NONE: Intersection = Intersection {
        ratio: 0.0,
        is_intersecting: false,
    };

    pub const FULL: Intersection = Intersection {
        ratio: 1.0,
        is_intersecting: true,
    };

    /// Whether this intersection counts as visible at `threshold`.
    pub fn meets(&self, threshold: Threshold) -> bool {
        self.is_intersecting && self.ratio >= threshold.get()
    }
}

/// Measure `target` against `root` grown (or shrunk) by `margin`.
///
/// Zero-area targets that touch the root report a ratio of 1.0; targets
/// that only share an edge with it intersect with a ratio of 0.0.
pub fn intersect(target: &Rect, root: &Rect, margin: &RootMargin) -> Intersection {
    let bounds = root.outset(&margin.resolve(root));
    if bounds.w < 0.0 || bounds.h < 0.0 {
        return Intersection::NONE;
    }
    let Some(hit) = target.intersection(&bounds) else {
        return Intersection::NONE;
    };

    let area = target.area();
    let ratio = if area > 0.0 {
        (hit.area() / area).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Intersection {
        ratio,
        is_intersecting: true,
    }
}
