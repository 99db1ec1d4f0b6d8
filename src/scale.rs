//! Display scale of a page inside a viewport.
//!
//! Scale is a purely visual transform applied after pagination; it is never
//! an input to it. Pagination always works at the 1:1 pixel size of the page
//! format.

use crate::model::PageGeometry;
use serde::{Deserialize, Serialize};

/// Bounds and axes used when fitting a page into a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConstraints {
    /// Smallest scale ever returned
    pub min_scale: f32,

    /// Largest scale ever returned
    pub max_scale: f32,

    /// Also fit the page height into the container height
    pub constrain_height: bool,
}

impl ScaleConstraints {
    /// Create constraints with explicit bounds, fitting width only.
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            min_scale,
            max_scale,
            constrain_height: false,
        }
    }

    /// Full-page single-column editor: width only, never above 1:1.
    pub fn full_page() -> Self {
        Self::new(0.3, 1.0)
    }

    /// Small thumbnail card: both axes, down to 0.2.
    pub fn thumbnail() -> Self {
        Self::new(0.2, 1.0).with_height(true)
    }

    /// Enable or disable fitting the height as well.
    pub fn with_height(mut self, constrain: bool) -> Self {
        self.constrain_height = constrain;
        self
    }
}

impl Default for ScaleConstraints {
    fn default() -> Self {
        Self::full_page()
    }
}

/// Compute the scale that fits a page of `geometry` into a container.
///
/// The result is `min(width ratio, height ratio if constrained, max_scale)`
/// clamped to `[min_scale, max_scale]`. A container without a usable size
/// yields `min_scale`. If one bound is not finite the other one is returned.
pub fn resolve_scale(
    container_width: f32,
    container_height: Option<f32>,
    geometry: &PageGeometry,
    constraints: &ScaleConstraints,
) -> f32 {
    let (min_scale, max_scale) = match (constraints.min_scale, constraints.max_scale) {
        (min, max) if min.is_finite() && max.is_finite() => (min.min(max), max),
        (min, _) if min.is_finite() => return min,
        (_, max) if max.is_finite() => return max,
        _ => return 1.0,
    };

    if !(container_width > 0.0) || geometry.width_px == 0 {
        return min_scale;
    }

    let mut scale = container_width / geometry.width_px as f32;
    if constraints.constrain_height {
        if let Some(height) = container_height {
            if !(height > 0.0) || geometry.height_px == 0 {
                return min_scale;
            }
            scale = scale.min(height / geometry.height_px as f32);
        }
    }

    scale.min(max_scale).clamp(min_scale, max_scale)
}
