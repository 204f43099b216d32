//! Style attribute bag carried by every object.
//!
//! Every field is optional in storage; accessors fall back to the board defaults.

use crate::geometry::ShapeKind;
use peniko::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FILL_COLOR: &str = "#ffffff";
pub const DEFAULT_STROKE_COLOR: &str = "#cad1da";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FONT_SIZE: f64 = 0.2;
pub const DEFAULT_TEXT_COLOR: &str = "#333333";
pub const TRANSPARENT: &str = "transparent";

/// Horizontal text alignment inside an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    /// Attributes not modelled above, kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectStyle {
    /// Style used for freshly placed shapes.
    pub fn shape(kind: ShapeKind) -> Self {
        Self {
            fill_color: Some(DEFAULT_FILL_COLOR.to_string()),
            stroke_color: Some(DEFAULT_STROKE_COLOR.to_string()),
            stroke_width: Some(DEFAULT_STROKE_WIDTH),
            opacity: Some(DEFAULT_OPACITY),
            shape_type: Some(kind),
            ..Self::default()
        }
    }

    pub fn fill_color(&self) -> &str {
        self.fill_color.as_deref().unwrap_or(DEFAULT_FILL_COLOR)
    }

    pub fn stroke_color(&self) -> &str {
        self.stroke_color.as_deref().unwrap_or(DEFAULT_STROKE_COLOR)
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH)
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.unwrap_or(DEFAULT_OPACITY)
    }

    pub fn shape_type(&self) -> ShapeKind {
        self.shape_type.unwrap_or_default()
    }

    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn text_color(&self) -> &str {
        self.text_color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR)
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align.unwrap_or_default()
    }

    /// Resolved fill, with opacity applied.
    pub fn fill(&self) -> Color {
        let color = parse_color(self.fill_color()).unwrap_or(Color::WHITE);
        color.multiply_alpha(self.opacity() as f32)
    }

    /// Resolved stroke, with opacity applied.
    pub fn stroke(&self) -> Color {
        let color = parse_color(self.stroke_color()).unwrap_or(Color::BLACK);
        color.multiply_alpha(self.opacity() as f32)
    }
}

/// Parse a CSS-style color: `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
pub fn parse_color(color: &str) -> Option<Color> {
    let color = color.trim();
    if color.eq_ignore_ascii_case(TRANSPARENT) {
        return Some(Color::TRANSPARENT);
    }

    let hex = color.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let r = byte(&hex[0..1])? * 17;
            let g = byte(&hex[1..2])? * 17;
            let b = byte(&hex[2..3])? * 17;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            255,
        )),
        8 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}
