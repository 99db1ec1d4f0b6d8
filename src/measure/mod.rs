//! Measurement surfaces: where candidate page content gets its true height.
//!
//! A surface is an off-screen, unscaled layout region as wide as the page's
//! content box, styled with the projected typography and the scoped author
//! CSS. Pagination only ever reads heights from it; nothing measured here is
//! shown to the user.
//!
//! # Example
//!
//! ```
//! use pagemark::measure::{EstimatingSurface, MountedSurface, SurfaceSpec};
//! use pagemark::{PageFormat, ThemeTokens};
//!
//! fn main() -> pagemark::Result<()> {
//!     let theme = ThemeTokens::default();
//!     let spec = SurfaceSpec::for_page(&PageFormat::A4.geometry(), &theme, "");
//!
//!     let mut surface = EstimatingSurface::new();
//!     let mut mounted = MountedSurface::mount(&mut surface, &spec)?;
//!     let height = mounted.measure("<p>Hello</p>")?;
//!     assert!(height > 0.0);
//!     Ok(())
//! }
//! ```

mod cascade;
mod estimate;

pub use estimate::EstimatingSurface;

use crate::error::Result;
use crate::model::{PageGeometry, ThemeTokens};
use crate::style::{project_stylesheet, MEASURE_SELECTOR};

/// Everything a surface needs to lay content out like a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    /// Content-box width in pixels (page width minus horizontal padding)
    pub width_px: f32,

    /// Selector the stylesheet is scoped to
    pub selector: String,

    /// Projected typography followed by the scoped author CSS
    pub stylesheet: String,

    /// Theme the stylesheet was projected from
    pub theme: ThemeTokens,
}

impl SurfaceSpec {
    /// Describe the surface for measuring content of one page.
    pub fn for_page(geometry: &PageGeometry, theme: &ThemeTokens, author_css: &str) -> Self {
        Self {
            width_px: geometry.usable_width(theme.page_padding),
            selector: MEASURE_SELECTOR.to_string(),
            stylesheet: project_stylesheet(theme, MEASURE_SELECTOR, author_css),
            theme: theme.clone(),
        }
    }
}

/// An off-screen layout region that reports rendered heights.
///
/// Implementations wrap a real layout engine (a browser DOM, a headless
/// renderer) or a layout model such as [`EstimatingSurface`]. Each
/// [`measure`](MeasurementSurface::measure) call replaces the surface
/// content, flushes layout, and reads back the content height.
pub trait MeasurementSurface {
    /// Create (or fully reset) the surface scaffolding for one run.
    fn mount(&mut self, spec: &SurfaceSpec) -> Result<()>;

    /// Replace the content with `html` and return its rendered height in pixels.
    ///
    /// Returns [`Error::MeasurementUnavailable`](crate::Error::MeasurementUnavailable)
    /// when the surface is not mounted or has no usable width.
    fn measure(&mut self, html: &str) -> Result<f32>;

    /// Remove all scaffolding created by [`mount`](MeasurementSurface::mount).
    fn unmount(&mut self);

    /// Check if the surface is currently mounted.
    fn is_mounted(&self) -> bool;
}

impl<S: MeasurementSurface + ?Sized> MeasurementSurface for &mut S {
    fn mount(&mut self, spec: &SurfaceSpec) -> Result<()> {
        (**self).mount(spec)
    }

    fn measure(&mut self, html: &str) -> Result<f32> {
        (**self).measure(html)
    }

    fn unmount(&mut self) {
        (**self).unmount()
    }

    fn is_mounted(&self) -> bool {
        (**self).is_mounted()
    }
}

impl<S: MeasurementSurface + ?Sized> MeasurementSurface for Box<S> {
    fn mount(&mut self, spec: &SurfaceSpec) -> Result<()> {
        (**self).mount(spec)
    }

    fn measure(&mut self, html: &str) -> Result<f32> {
        (**self).measure(html)
    }

    fn unmount(&mut self) {
        (**self).unmount()
    }

    fn is_mounted(&self) -> bool {
        (**self).is_mounted()
    }
}

/// A mounted surface that unmounts itself when dropped.
///
/// Holding the guard for the length of a run guarantees the scaffolding is
/// removed on every exit path, early returns and errors included.
pub struct MountedSurface<'s, S: MeasurementSurface + ?Sized> {
    surface: &'s mut S,
    measurements: usize,
}

impl<'s, S: MeasurementSurface + ?Sized> MountedSurface<'s, S> {
    /// Mount `surface` for `spec`.
    ///
    /// If mounting fails the surface is unmounted before the error is returned.
    pub fn mount(surface: &'s mut S, spec: &SurfaceSpec) -> Result<Self> {
        if let Err(err) = surface.mount(spec) {
            surface.unmount();
            return Err(err);
        }
        Ok(Self {
            surface,
            measurements: 0,
        })
    }

    /// Measure the rendered height of `html`.
    pub fn measure(&mut self, html: &str) -> Result<f32> {
        self.measurements += 1;
        self.surface.measure(html)
    }

    /// Number of measurements taken through this guard.
    pub fn measurements(&self) -> usize {
        self.measurements
    }
}

impl<S: MeasurementSurface + ?Sized> Drop for MountedSurface<'_, S> {
    fn drop(&mut self) {
        self.surface.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::PageFormat;

    #[test]
    fn test_surface_spec_for_page() {
        let theme = ThemeTokens::default();
        let spec = SurfaceSpec::for_page(&PageFormat::A4.geometry(), &theme, ".x { color: red; }");
        assert_eq!(spec.width_px, 762.0);
        assert_eq!(spec.selector, MEASURE_SELECTOR);
        assert!(spec.stylesheet.contains(".pagemark-measure .x { color: red; }"));
    }

    #[test]
    fn test_guard_unmounts_on_drop() {
        let spec = SurfaceSpec::for_page(
            &PageFormat::Letter.geometry(),
            &ThemeTokens::default(),
            "",
        );
        let mut surface = EstimatingSurface::new();
        {
            let mut mounted = MountedSurface::mount(&mut surface, &spec).unwrap();
            assert!(mounted.measure("<p>x</p>").is_ok());
            assert_eq!(mounted.measurements(), 1);
        }
        assert!(!surface.is_mounted());
        assert!(matches!(
            surface.measure("<p>x</p>"),
            Err(Error::MeasurementUnavailable(_))
        ));
    }
}
