//! Theme tokens driving typography projection and measurement.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Typography and spacing tokens supplied by the caller.
///
/// Units are fixed: `font_size` and `page_padding` are pixels, `line_height`
/// is a unitless multiplier and `paragraph_spacing` is a rem multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeTokens {
    /// Text color (any CSS color)
    pub color: String,

    /// Base font size in pixels
    pub font_size: f32,

    /// Unitless line height multiplier
    pub line_height: f32,

    /// Page padding in pixels, applied on every side
    pub page_padding: f32,

    /// Block spacing multiplier in rem
    pub paragraph_spacing: f32,
}

impl ThemeTokens {
    /// Create theme tokens with the fallback defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the base font size in pixels.
    pub fn with_font_size(mut self, px: f32) -> Self {
        self.font_size = px;
        self
    }

    /// Set the line height multiplier.
    pub fn with_line_height(mut self, multiplier: f32) -> Self {
        self.line_height = multiplier;
        self
    }

    /// Set the page padding in pixels.
    pub fn with_page_padding(mut self, px: f32) -> Self {
        self.page_padding = px;
        self
    }

    /// Set the paragraph spacing in rem.
    pub fn with_paragraph_spacing(mut self, rem: f32) -> Self {
        self.paragraph_spacing = rem;
        self
    }

    /// Check that every numeric token is finite and in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("fontSize", self.font_size),
            ("lineHeight", self.line_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidTheme(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("pagePadding", self.page_padding),
            ("paragraphSpacing", self.paragraph_spacing),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidTheme(format!(
                    "{} must be zero or positive, got {}",
                    name, value
                )));
            }
        }

        if self.color.trim().is_empty() {
            return Err(Error::InvalidTheme("color must not be empty".into()));
        }
        Ok(())
    }

    /// Line box height of body text in pixels.
    pub fn line_box_px(&self) -> f32 {
        self.font_size * self.line_height
    }
}

impl Default for ThemeTokens {
    fn default() -> Self {
        Self {
            color: "#3ECF8E".to_string(),
            font_size: 12.0,
            line_height: 1.4,
            page_padding: 16.0,
            paragraph_spacing: 1.0,
        }
    }
}

impl Hash for ThemeTokens {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.hash(state);
        self.font_size.to_bits().hash(state);
        self.line_height.to_bits().hash(state);
        self.page_padding.to_bits().hash(state);
        self.paragraph_spacing.to_bits().hash(state);
    }
}
