//! # Styles and Theme
//!
//! Drawing styles passed to the canvas and the report theme derived from the
//! template (primary/secondary colors, font family, base font size).
//!
//! Template colors are user-entered hex strings. An unparseable value falls
//! back to the default theme color with a warning instead of failing the run.

use serde::{Deserialize, Serialize};

use crate::font::FontFamily;

/// RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    // Severity and outcome palette
    pub const RED: Color = Color {
        r: 0.863,
        g: 0.149,
        b: 0.149,
    };
    pub const ORANGE: Color = Color {
        r: 0.918,
        g: 0.475,
        b: 0.047,
    };
    pub const AMBER: Color = Color {
        r: 0.851,
        g: 0.655,
        b: 0.059,
    };
    pub const GREEN: Color = Color {
        r: 0.086,
        g: 0.639,
        b: 0.290,
    };
    pub const GRAY: Color = Color {
        r: 0.420,
        g: 0.447,
        b: 0.502,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`. Returns `None` for anything else.
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
            ),
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self::rgb(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
        ))
    }

    /// Parse a hex color, falling back to `default` with a warning.
    pub fn hex_or(hex: &str, default: Color) -> Self {
        match Self::hex(hex) {
            Some(c) => c,
            None => {
                log::warn!("Invalid color '{}', using default", hex);
                default
            }
        }
    }

    /// Blend towards white. `amount` 0.0 keeps the color, 1.0 gives white.
    pub fn lighten(&self, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        Self::rgb(
            self.r + (1.0 - self.r) * t,
            self.g + (1.0 - self.g) * t,
            self.b + (1.0 - self.b) * t,
        )
    }

    /// Relative luminance (sRGB approximation).
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Black or white, whichever reads better on this background.
    pub fn contrasting_text(&self) -> Self {
        if self.luminance() > 0.55 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Style for a single run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: FontFamily,
    pub font_size: f64,
    pub bold: bool,
    pub color: Color,
}

impl TextStyle {
    /// Line height used for layout: 1.3 × font size.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.3
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn sized(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Helvetica,
            font_size: 10.0,
            bold: false,
            color: Color::BLACK,
        }
    }
}

/// Fill and/or stroke for a rectangle. A zero-height rect with a stroke is a rule line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl RectStyle {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
        }
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }
}

/// Resolved visual theme for one generation run.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub font_family: FontFamily,
    pub base_size: f64,
}

impl Theme {
    pub const DEFAULT_PRIMARY: Color = Color {
        r: 0.118,
        g: 0.251,
        b: 0.686,
    };
    pub const DEFAULT_SECONDARY: Color = Color {
        r: 0.392,
        g: 0.455,
        b: 0.545,
    };

    pub fn new(primary: &str, secondary: &str, font_family: &str, base_size: f64) -> Self {
        let base_size = if base_size.is_finite() && base_size >= 6.0 {
            base_size
        } else {
            log::warn!("Invalid base font size {}, using 10", base_size);
            10.0
        };
        Self {
            primary: Color::hex_or(primary, Self::DEFAULT_PRIMARY),
            secondary: Color::hex_or(secondary, Self::DEFAULT_SECONDARY),
            font_family: FontFamily::from_name(font_family),
            base_size,
        }
    }

    pub fn body(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family,
            font_size: self.base_size,
            bold: false,
            color: Color::BLACK,
        }
    }

    pub fn small(&self) -> TextStyle {
        self.body().sized((self.base_size - 2.0).max(6.0))
    }

    pub fn label(&self) -> TextStyle {
        self.body().bold()
    }

    pub fn heading(&self) -> TextStyle {
        self.body()
            .sized(self.base_size + 3.0)
            .bold()
            .colored(self.primary)
    }

    pub fn subheading(&self) -> TextStyle {
        self.body()
            .sized(self.base_size + 1.0)
            .bold()
            .colored(self.secondary)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Self::DEFAULT_PRIMARY,
            secondary: Self::DEFAULT_SECONDARY,
            font_family: FontFamily::Helvetica,
            base_size: 10.0,
        }
    }
}
