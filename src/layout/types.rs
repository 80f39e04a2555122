//! Data structures produced by edge routing.

use crate::geometry::{Point, Rect};
use serde::Serialize;

/// Which axis a connection leaves and enters along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A side of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Midpoint of this side of `rect`.
    pub fn midpoint(self, rect: &Rect) -> Point {
        let c = rect.center();
        match self {
            Side::Left => Point::new(rect.x, c.y),
            Side::Right => Point::new(rect.right(), c.y),
            Side::Top => Point::new(c.x, rect.y),
            Side::Bottom => Point::new(c.x, rect.bottom()),
        }
    }

    /// Unit vector pointing out of the card through this side.
    pub fn outward(self) -> Point {
        match self {
            Side::Left => Point::new(-1.0, 0.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Top => Point::new(0.0, -1.0),
            Side::Bottom => Point::new(0.0, 1.0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Horizontal,
            Side::Top | Side::Bottom => Axis::Vertical,
        }
    }
}

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CubicBezier {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl CubicBezier {
    /// Sample the curve at parameter t in [0, 1].
    pub fn sample(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        self.start * (mt * mt * mt)
            + self.control1 * (3.0 * mt * mt * t)
            + self.control2 * (3.0 * mt * t * t)
            + self.end * (t * t * t)
    }

    /// Point at t = 0.5, `(P0 + 3·C1 + 3·C2 + P3) / 8`.
    pub fn midpoint(&self) -> Point {
        (self.start + self.control1 * 3.0 + self.control2 * 3.0 + self.end) / 8.0
    }

    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            start: f(self.start),
            control1: f(self.control1),
            control2: f(self.control2),
            end: f(self.end),
        }
    }
}

/// A routed reference edge, in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    /// Position among the routed edges; `(source, target, index)` is the key.
    pub index: usize,
    /// Name of the reference field.
    pub label: String,
    pub axis: Axis,
    pub source_side: Side,
    pub target_side: Side,
    pub curve: CubicBezier,
    /// Background plate behind the label, centered on the curve midpoint.
    pub label_plate: Rect,
}

impl LayoutEdge {
    pub fn from_point(&self) -> Point {
        self.curve.start
    }

    pub fn to_point(&self) -> Point {
        self.curve.end
    }

    pub fn label_point(&self) -> Point {
        self.label_plate.center()
    }

    pub fn is_self_ref(&self) -> bool {
        self.source == self.target
    }
}
