//! Tunable constants for interaction and placement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaveConfig {
    /// Smallest half-extent a resize may commit.
    pub min_scale: f64,
    /// World size of a selection handle marker.
    pub handle_size: f64,
    /// Text wrap width as a multiple of `scale.x`.
    pub text_wrap_factor: f64,
    /// Duplicate offset as a fraction of the source scale.
    pub duplicate_offset_factor: f64,
    /// Z distance used by bring-to-front / send-to-back.
    pub reorder_step: f64,
    pub sticky_cascade_step: f64,
    pub sticky_max_attempts: usize,
    pub sticky_occupancy_tolerance: f64,
    /// Distance between successive new shapes.
    pub shape_spacing: f64,
    /// New-shape placement wraps back to the origin after this distance.
    pub shape_wrap: f64,
    pub circle_segments: usize,
    pub border_circle_segments: usize,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            handle_size: 0.12,
            text_wrap_factor: 1.8,
            duplicate_offset_factor: 0.5,
            reorder_step: 0.1,
            sticky_cascade_step: 0.5,
            sticky_max_attempts: 20,
            sticky_occupancy_tolerance: 0.01,
            shape_spacing: 2.0,
            shape_wrap: 20.0,
            circle_segments: 48,
            border_circle_segments: 64,
        }
    }
}

impl WeaveConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WeaveConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("minScale", self.min_scale),
            ("handleSize", self.handle_size),
            ("shapeWrap", self.shape_wrap),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if self.circle_segments < 3 || self.border_circle_segments < 3 {
            return Err(ConfigError::Invalid {
                field: "circleSegments",
                reason: "a circle needs at least 3 segments".to_string(),
            });
        }
        Ok(())
    }
}
