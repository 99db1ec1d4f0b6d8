//! Pagination engine: rendered HTML plus page geometry in, page fragments out.
//!
//! A run first measures the whole fragment. If it fits the usable page height
//! (`page height - 2 * padding`) the original markup is the only page.
//! Otherwise the top-level elements are packed greedily: each element joins
//! the current page unless the measured page would exceed the usable height,
//! in which case the page is closed and the element starts the next one. An
//! element taller than a page on its own still gets a page to itself.
//!
//! # Example
//!
//! ```
//! use pagemark::measure::EstimatingSurface;
//! use pagemark::paginate::{PageInput, Paginator};
//! use pagemark::PageFormat;
//!
//! let mut paginator = Paginator::new(EstimatingSurface::new());
//! let input = PageInput::new("<h1>Jane Doe</h1><p>Engineer.</p>").with_format(PageFormat::Letter);
//! let pagination = paginator.paginate(&input);
//! assert_eq!(pagination.page_count(), 1);
//! ```

mod engine;
pub(crate) mod fragment;

pub use engine::Paginator;
pub use fragment::{is_void_element, parse_units, split_blocks, Blocks, Unit};

use crate::measure::MeasurementSurface;
use crate::model::{PageFormat, Pagination, ThemeTokens};
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Everything one pagination run depends on.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct PageInput {
    /// Rendered content fragment
    pub html: String,

    /// Target page format
    pub format: PageFormat,

    /// Theme tokens (padding, typography)
    pub theme: ThemeTokens,

    /// Author CSS targeting the content-root marker
    pub author_css: String,
}

impl PageInput {
    /// Create an input for `html` with the default format and theme.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            format: PageFormat::default(),
            theme: ThemeTokens::default(),
            author_css: String::new(),
        }
    }

    /// Set the page format.
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the theme tokens.
    pub fn with_theme(mut self, theme: ThemeTokens) -> Self {
        self.theme = theme;
        self
    }

    /// Set the author CSS.
    pub fn with_author_css(mut self, css: impl Into<String>) -> Self {
        self.author_css = css.into();
        self
    }

    /// Stable fingerprint of the input, used to detect changed inputs.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Paginate several documents in parallel.
///
/// Every run gets its own surface from `make_surface`, so no scaffolding is
/// shared between documents. Results keep the order of `inputs`.
pub fn paginate_batch<S, F>(inputs: &[PageInput], make_surface: F) -> Vec<Pagination>
where
    S: MeasurementSurface,
    F: Fn() -> S + Sync,
{
    inputs
        .par_iter()
        .map(|input| Paginator::new(make_surface()).paginate(input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::EstimatingSurface;

    #[test]
    fn test_page_input_builder() {
        let input = PageInput::new("<p>a</p>")
            .with_format(PageFormat::Letter)
            .with_author_css(".cv-container { color: red; }");
        assert_eq!(input.format, PageFormat::Letter);
        assert_eq!(input.theme, ThemeTokens::default());
        assert!(input.author_css.contains("cv-container"));
    }

    #[test]
    fn test_fingerprint_tracks_every_field() {
        let base = PageInput::new("<p>a</p>");
        assert_eq!(base.fingerprint(), base.clone().fingerprint());
        assert_ne!(
            base.fingerprint(),
            base.clone().with_format(PageFormat::Letter).fingerprint()
        );
        assert_ne!(
            base.fingerprint(),
            base.clone()
                .with_theme(ThemeTokens::default().with_font_size(13.0))
                .fingerprint()
        );
        assert_ne!(
            base.fingerprint(),
            base.clone().with_author_css("p {}").fingerprint()
        );
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let long: String = (0..200)
            .map(|i| format!("<p>Paragraph {} with a little text.</p>", i))
            .collect();
        let inputs = vec![
            PageInput::new("<p>short</p>"),
            PageInput::new(long.clone()),
            PageInput::new(""),
        ];
        let results = paginate_batch(&inputs, EstimatingSurface::new);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].page_count(), 1);
        assert!(results[1].page_count() > 1);
        assert!(results[2].is_empty());

        let sequential = Paginator::new(EstimatingSurface::new()).paginate(&inputs[1]);
        assert_eq!(results[1], sequential);
    }
}
