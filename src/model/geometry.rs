//! Page formats and their fixed pixel geometry.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named physical page format.
///
/// The mapping from format to [`PageGeometry`] is a stable contract; adding a
/// format means adding a row to [`PageFormat::geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    /// ISO A4 (210 x 297 mm)
    #[default]
    A4,
    /// US Letter (216 x 279 mm)
    Letter,
}

impl PageFormat {
    /// All supported formats.
    pub const ALL: [PageFormat; 2] = [PageFormat::A4, PageFormat::Letter];

    /// Get the pixel geometry of this format at 96 dpi.
    pub fn geometry(self) -> PageGeometry {
        match self {
            PageFormat::A4 => PageGeometry {
                width_px: 794,
                height_px: 1123,
                width_mm: 210,
                height_mm: 297,
            },
            PageFormat::Letter => PageGeometry {
                width_px: 816,
                height_px: 1056,
                width_mm: 216,
                height_mm: 279,
            },
        }
    }

    /// Name used in CSS `@page { size: ... }` and in the external contract.
    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "Letter",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            _ => Err(Error::UnknownPageFormat(s.to_string())),
        }
    }
}

/// Fixed dimensions of a physical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Page width in CSS pixels
    pub width_px: u32,
    /// Page height in CSS pixels
    pub height_px: u32,
    /// Page width in millimetres
    pub width_mm: u32,
    /// Page height in millimetres
    pub height_mm: u32,
}

impl PageGeometry {
    /// Width of the content box once `padding` is removed from both sides.
    pub fn usable_width(&self, padding: f32) -> f32 {
        self.width_px as f32 - 2.0 * padding
    }

    /// Height of the content box once `padding` is removed from top and bottom.
    pub fn usable_height(&self, padding: f32) -> f32 {
        self.height_px as f32 - 2.0 * padding
    }

    /// Page dimensions as (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

impl From<PageFormat> for PageGeometry {
    fn from(format: PageFormat) -> Self {
        format.geometry()
    }
}
