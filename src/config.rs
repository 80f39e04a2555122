//! Tuning knobs for the canvas. Every section has a `Default`, and any
//! subset of it can be loaded from JSON.

use crate::ir::DEFAULT_PREVIEW_ROWS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub card: CardGeometry,
    pub zoom: ZoomConfig,
    pub curve: CurveConfig,
    pub label: LabelConfig,
    /// Card rows before "+N more fields".
    pub preview_rows: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            card: CardGeometry::default(),
            zoom: ZoomConfig::default(),
            curve: CurveConfig::default(),
            label: LabelConfig::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value {key}: {reason}")]
    Invalid {
        key: &'static str,
        reason: &'static str,
    },
}

impl CanvasConfig {
    /// Parse a (partial) config and reject values the canvas cannot use.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("card.width", self.card.width)?;
        positive("card.height", self.card.height)?;
        positive("zoom.min", self.zoom.min)?;
        positive("zoom.max", self.zoom.max)?;
        if self.zoom.min > self.zoom.max {
            return Err(ConfigError::Invalid {
                key: "zoom.min",
                reason: "must not exceed zoom.max",
            });
        }
        positive("zoom.step", self.zoom.step)?;
        positive("zoom.wheel_factor", self.zoom.wheel_factor)?;
        non_negative("curve.max_offset", self.curve.max_offset)?;
        non_negative("curve.distance_factor", self.curve.distance_factor)?;
        positive("label.char_width", self.label.char_width)?;
        positive("label.plate_height", self.label.plate_height)?;
        positive("label.font_size", self.label.font_size)?;
        if self.preview_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "preview_rows",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: "must be a finite number above zero",
        })
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: "must be a finite number, zero or more",
        })
    }
}

/// Logical card size used for anchors. Rendered cards may be taller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardGeometry {
    pub width: f64,
    pub height: f64,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            width: 256.0,
            height: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    /// Discrete zoom in/out step.
    pub step: f64,
    /// Multiplier applied to `-deltaY` of a ctrl/cmd + wheel event.
    pub wheel_factor: f64,
}

impl ZoomConfig {
    /// Clamp into `[min, max]`. An inverted range resolves to `max`
    /// instead of panicking like `f64::clamp`.
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 3.0,
            step: 0.1,
            wheel_factor: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Upper bound of the control point offset.
    pub max_offset: f64,
    /// Control point offset as a fraction of anchor distance.
    pub distance_factor: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            max_offset: 80.0,
            distance_factor: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Plate width per display column of the label.
    pub char_width: f64,
    pub plate_height: f64,
    pub font_size: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            char_width: 6.0,
            plate_height: 16.0,
            font_size: 11.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg =
            CanvasConfig::from_json(r#"{ "zoom": { "max": 2.0 }, "preview_rows": 4 }"#).unwrap();
        assert_eq!(cfg.zoom.max, 2.0);
        assert_eq!(cfg.zoom.min, 0.25);
        assert_eq!(cfg.card, CardGeometry::default());
        assert_eq!(cfg.preview_rows, 4);
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let err = CanvasConfig::from_json(r#"{ "zoom": { "min": 5.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "zoom.min", .. }));
    }

    #[test]
    fn test_unusable_values_rejected() {
        for json in [
            r#"{ "zoom": { "min": 0.0 } }"#,
            r#"{ "zoom": { "max": -1.0 } }"#,
            r#"{ "card": { "width": 0.0 } }"#,
            r#"{ "card": { "height": -120.0 } }"#,
            r#"{ "preview_rows": 0 }"#,
            r#"{ "label": { "char_width": 0.0 } }"#,
            r#"{ "curve": { "max_offset": -1.0 } }"#,
        ] {
            assert!(
                matches!(CanvasConfig::from_json(json), Err(ConfigError::Invalid { .. })),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(
            CanvasConfig::from_json("{ zoom"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(CanvasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(CanvasConfig::from_json("{}").unwrap(), CanvasConfig::default());
    }
}
