//! Curve and label generation for anchored connections.

use crate::config::{CurveConfig, LabelConfig};
use crate::geometry::Rect;
use crate::measure::columns;

use super::anchors::AnchorPair;
use super::types::CubicBezier;

/// Control point offset: proportional to anchor distance, capped.
#[inline]
pub fn curve_offset(distance: f64, config: &CurveConfig) -> f64 {
    (distance * config.distance_factor).min(config.max_offset)
}

/// Single cubic curve between two anchors.
///
/// Control points leave the source along its side's outward normal and
/// arrive at the target against its side's outward normal, so the curve
/// bows out of both cards.
pub fn route_curve(anchors: &AnchorPair, config: &CurveConfig) -> CubicBezier {
    let offset = curve_offset(anchors.from.distance(anchors.to), config);

    CubicBezier {
        start: anchors.from,
        control1: anchors.from + anchors.source_side.outward() * offset,
        control2: anchors.to + anchors.target_side.outward() * offset,
        end: anchors.to,
    }
}

/// Background plate for an edge label, centered on the curve midpoint.
/// Width follows a fixed per-column advance rather than real font metrics.
pub fn label_plate(curve: &CubicBezier, label: &str, config: &LabelConfig) -> Rect {
    let mid = curve.midpoint();
    let width = columns(label) as f64 * config.char_width;
    Rect::new(
        mid.x - width / 2.0,
        mid.y - config.plate_height / 2.0,
        width,
        config.plate_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::layout::anchors::calculate_anchors;
    use crate::layout::types::Axis;

    fn card(x: f64, y: f64) -> Rect {
        Rect::new(x, y, 256.0, 120.0)
    }

    #[test]
    fn test_offset_capped_on_long_edges() {
        let cfg = CurveConfig::default();
        assert_eq!(curve_offset(1000.0, &cfg), 80.0);
        assert_eq!(curve_offset(100.0, &cfg), 40.0);
        assert_eq!(curve_offset(0.0, &cfg), 0.0);
    }

    #[test]
    fn test_horizontal_curve_bows_outward() {
        let anchors = calculate_anchors(&card(0.0, 0.0), &card(600.0, 0.0));
        assert_eq!(anchors.axis, Axis::Horizontal);
        let curve = route_curve(&anchors, &CurveConfig::default());

        assert_eq!(curve.start, Point::new(256.0, 60.0));
        assert_eq!(curve.control1, Point::new(336.0, 60.0));
        assert_eq!(curve.control2, Point::new(520.0, 60.0));
        assert_eq!(curve.end, Point::new(600.0, 60.0));
    }

    #[test]
    fn test_vertical_curve_upwards() {
        let anchors = calculate_anchors(&card(0.0, 300.0), &card(0.0, 0.0));
        let curve = route_curve(&anchors, &CurveConfig::default());
        // anchors 180 apart: offset = 72
        assert_eq!(curve.start, Point::new(128.0, 300.0));
        assert_eq!(curve.control1, Point::new(128.0, 228.0));
        assert_eq!(curve.control2, Point::new(128.0, 192.0));
        assert_eq!(curve.end, Point::new(128.0, 120.0));
    }

    #[test]
    fn test_midpoint_matches_sample() {
        let anchors = calculate_anchors(&card(0.0, 0.0), &card(400.0, 250.0));
        let curve = route_curve(&anchors, &CurveConfig::default());
        let a = curve.midpoint();
        let b = curve.sample(0.5);
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    }

    #[test]
    fn test_label_plate_centered() {
        let anchors = calculate_anchors(&card(0.0, 0.0), &card(600.0, 0.0));
        let curve = route_curve(&anchors, &CurveConfig::default());
        let plate = label_plate(&curve, "author", &LabelConfig::default());
        assert_eq!(plate.width, 36.0);
        assert_eq!(plate.height, 16.0);
        assert_eq!(plate.center(), curve.midpoint());
    }
}
