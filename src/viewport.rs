//! Pan/zoom state of the canvas and world ↔ screen conversion.

use crate::config::ZoomConfig;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub pan_offset: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_offset: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, p: Point) -> Point {
        p * self.zoom + self.pan_offset
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        (p - self.pan_offset) / self.zoom
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let origin = self.world_to_screen(r.origin());
        Rect::from_origin(origin, r.width * self.zoom, r.height * self.zoom)
    }

    pub fn rect_to_world(&self, r: Rect) -> Rect {
        let origin = self.screen_to_world(r.origin());
        Rect::from_origin(origin, r.width / self.zoom, r.height / self.zoom)
    }

    /// Shift by a screen-space delta. The delta is not scaled by zoom.
    pub fn pan(&mut self, delta: Point) {
        self.pan_offset += delta;
    }

    /// Add `delta` to the zoom factor, clamped to the configured range.
    ///
    /// With a focal point (screen space), the world point under it stays
    /// put; without one, zoom is about the screen origin.
    pub fn zoom_by(&mut self, delta: f64, focal: Option<Point>, limits: &ZoomConfig) {
        self.set_zoom(self.zoom + delta, focal, limits);
    }

    pub fn set_zoom(&mut self, zoom: f64, focal: Option<Point>, limits: &ZoomConfig) {
        if !zoom.is_finite() {
            return;
        }
        let new_zoom = limits.clamp(zoom);
        if let Some(focal) = focal {
            let anchor = self.screen_to_world(focal);
            self.pan_offset = focal - anchor * new_zoom;
        }
        self.zoom = new_zoom;
    }

    /// Bring an externally supplied viewport into range.
    pub fn clamped(mut self, limits: &ZoomConfig) -> Self {
        if !self.zoom.is_finite() {
            self.zoom = 1.0;
        }
        self.zoom = limits.clamp(self.zoom);
        self
    }

    pub fn reset_view(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_inverted_limits_do_not_panic() {
        let limits = ZoomConfig {
            min: 5.0,
            ..ZoomConfig::default()
        };
        let mut vp = Viewport::default();
        vp.zoom_by(0.1, None, &limits);
        assert_eq!(vp.zoom, limits.max);
        let vp = Viewport {
            pan_offset: Point::ORIGIN,
            zoom: 0.5,
        }
        .clamped(&limits);
        assert_eq!(vp.zoom, limits.max);
    }

    #[test]
    fn test_transform_formulas() {
        let vp = Viewport {
            pan_offset: Point::new(10.0, -20.0),
            zoom: 2.0,
        };
        assert_eq!(vp.world_to_screen(Point::new(5.0, 5.0)), Point::new(20.0, -10.0));
        assert_eq!(vp.screen_to_world(Point::new(20.0, -10.0)), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_pan_ignores_zoom() {
        let mut vp = Viewport {
            pan_offset: Point::ORIGIN,
            zoom: 3.0,
        };
        vp.pan(Point::new(7.0, -4.0));
        assert_eq!(vp.pan_offset, Point::new(7.0, -4.0));
    }

    #[test]
    fn test_zoom_about_origin() {
        let mut vp = Viewport::default();
        vp.pan(Point::new(30.0, 30.0));
        vp.zoom_by(0.5, None, &ZoomConfig::default());
        assert_eq!(vp.zoom, 1.5);
        assert_eq!(vp.pan_offset, Point::new(30.0, 30.0));
    }

    #[test]
    fn test_zoom_keeps_focal_point() {
        let limits = ZoomConfig::default();
        let mut vp = Viewport::default();
        vp.pan(Point::new(-40.0, 15.0));
        let focal = Point::new(200.0, 120.0);
        let before = vp.screen_to_world(focal);
        vp.zoom_by(0.7, Some(focal), &limits);
        assert!(approx(vp.screen_to_world(focal), before));
    }

    #[test]
    fn test_reset_view() {
        let mut vp = Viewport {
            pan_offset: Point::new(1.0, 2.0),
            zoom: 0.5,
        };
        vp.reset_view();
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn test_nan_zoom_ignored() {
        let mut vp = Viewport::default();
        vp.zoom_by(f64::NAN, None, &ZoomConfig::default());
        assert_eq!(vp.zoom, 1.0);
    }

    proptest! {
        #[test]
        fn prop_zoom_stays_clamped(
            step in -0.5f64..0.5,
            repeats in 1usize..200,
        ) {
            let limits = ZoomConfig::default();
            let mut vp = Viewport::default();
            for _ in 0..repeats {
                vp.zoom_by(step, None, &limits);
                prop_assert!(vp.zoom >= limits.min && vp.zoom <= limits.max);
            }
        }

        #[test]
        fn prop_screen_world_inverse(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            px in -500.0f64..500.0,
            py in -500.0f64..500.0,
            zoom in 0.25f64..3.0,
        ) {
            let vp = Viewport { pan_offset: Point::new(px, py), zoom };
            let p = Point::new(x, y);
            let back = vp.screen_to_world(vp.world_to_screen(p));
            prop_assert!((back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6);
        }
    }
}
