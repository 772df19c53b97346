//! Stateless edge, containment, and index math.

use crate::{Point, Rect};

/// Which edges of a rectangle a point is close to, and how close.
///
/// Distances are measured from the point to each edge, inward. An edge is flagged as near only
/// when the point is inside the rectangle and strictly closer than the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeProximity {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub distance_top: f64,
    pub distance_bottom: f64,
    pub distance_left: f64,
    pub distance_right: f64,
}

impl EdgeProximity {
    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// Returns `true` when `point` lies inside `rect` (edges inclusive).
pub fn contains(rect: &Rect, point: Point) -> bool {
    point.x >= rect.left && point.x <= rect.right() && point.y >= rect.top && point.y <= rect.bottom()
}

/// The point inside `rect` nearest to `point`.
pub fn clamp_point(rect: &Rect, point: Point) -> Point {
    Point::new(
        point.x.max(rect.left).min(rect.right()),
        point.y.max(rect.top).min(rect.bottom()),
    )
}

/// Computes near-edge flags for `point` within `rect` using `threshold` pixels.
///
/// A point outside the rectangle is never near any edge.
pub fn near_edges(rect: &Rect, point: Point, threshold: f64) -> EdgeProximity {
    let mut out = EdgeProximity {
        distance_top: point.y - rect.top,
        distance_bottom: rect.bottom() - point.y,
        distance_left: point.x - rect.left,
        distance_right: rect.right() - point.x,
        ..EdgeProximity::default()
    };
    if threshold <= 0.0 || !contains(rect, point) {
        return out;
    }
    out.top = out.distance_top < threshold;
    out.bottom = out.distance_bottom < threshold;
    out.left = out.distance_left < threshold;
    out.right = out.distance_right < threshold;
    out
}

/// Fixed-height offset to index: `floor(offset / item_height)`, with non-positive inputs
/// mapping to `0`.
pub fn fixed_index_at_offset(offset: f64, item_height: f64) -> usize {
    if item_height <= 0.0 || offset <= 0.0 || offset.is_nan() {
        return 0;
    }
    // Truncation equals floor for positive values.
    (offset / item_height) as usize
}

/// Converts a non-negative pixel coordinate to an integral list offset.
pub(crate) fn to_offset(px: f64) -> u64 {
    if px <= 0.0 || px.is_nan() {
        return 0;
    }
    px as u64
}
