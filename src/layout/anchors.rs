//! Edge anchor calculation for cards.

use crate::geometry::{Point, Rect};

use super::types::{Axis, Side};

/// Exit and entry points of one connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    pub axis: Axis,
    pub source_side: Side,
    pub target_side: Side,
    pub from: Point,
    pub to: Point,
}

/// Pick the card sides a connection uses from the center-to-center delta.
///
/// Wider than tall goes through left/right, otherwise top/bottom. A zero
/// delta (self-reference, stacked cards) counts as horizontal, rightwards.
pub fn choose_sides(dx: f64, dy: f64) -> (Side, Side) {
    let degenerate = dx == 0.0 && dy == 0.0;
    if degenerate || dx.abs() > dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

/// Anchor a connection on the midpoints of the chosen sides.
pub fn calculate_anchors(source: &Rect, target: &Rect) -> AnchorPair {
    let delta = target.center() - source.center();
    let (source_side, target_side) = choose_sides(delta.x, delta.y);

    AnchorPair {
        axis: source_side.axis(),
        source_side,
        target_side,
        from: source_side.midpoint(source),
        to: target_side.midpoint(target),
    }
}
