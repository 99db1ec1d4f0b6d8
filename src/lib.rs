//! # pagemark
//!
//! Paginated document rendering for Rust.
//!
//! This library turns an author document (markdown with YAML frontmatter)
//! into discrete, print-accurate pages: content is laid out on a measurement
//! surface, split greedily at element boundaries, and re-assembled for print
//! with the same typography the preview uses.
//!
//! ## Quick Start
//!
//! ```
//! use pagemark::{Pagemark, PageFormat};
//!
//! fn main() -> pagemark::Result<()> {
//!     let result = Pagemark::new()
//!         .with_format(PageFormat::Letter)
//!         .render("---\nname: Jane Doe\n---\n## Experience\n\nEngineer.\n")?;
//!
//!     println!("{} page(s)", result.pages().page_count());
//!     let print = result.to_print_document();
//!     assert_eq!(print.page_count(), result.pages().page_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Measurement-driven pagination**: page breaks follow rendered heights
//! - **Pluggable surfaces**: any layout engine behind [`MeasurementSurface`]
//! - **Theme projection**: one theme, identical CSS on every surface
//! - **Print export**: one page block per page, forced breaks, `@page` size
//! - **Parallel batches**: Uses Rayon for multi-document pagination

pub mod content;
pub mod error;
pub mod export;
pub mod measure;
pub mod model;
pub mod paginate;
pub mod scale;
pub mod session;
pub mod style;

// Re-export commonly used types
pub use content::{ContentRenderer, Frontmatter, MarkdownContentRenderer};
pub use error::{Error, Result};
pub use export::{assemble_for_print, print_with, ExportOptions, PrintDocument, PrintHost};
pub use measure::{EstimatingSurface, MeasurementSurface, MountedSurface, SurfaceSpec};
pub use model::{PageFormat, PageGeometry, Pagination, ThemeTokens};
pub use paginate::{paginate_batch, PageInput, Paginator};
pub use scale::{resolve_scale, ScaleConstraints};
pub use session::{PreviewSession, Ticket};
pub use style::{project_stylesheet, project_typography, scope_author_css};

/// Paginate an HTML fragment with the built-in estimating surface.
///
/// # Example
///
/// ```
/// use pagemark::{paginate_html, PageFormat, ThemeTokens};
///
/// let pages = paginate_html("<p>Hello</p>", PageFormat::A4, &ThemeTokens::default(), "");
/// assert_eq!(pages.pages, vec!["<p>Hello</p>".to_string()]);
/// ```
pub fn paginate_html(
    html: &str,
    format: PageFormat,
    theme: &ThemeTokens,
    author_css: &str,
) -> Pagination {
    let input = PageInput::new(html)
        .with_format(format)
        .with_theme(theme.clone())
        .with_author_css(author_css);
    Paginator::new(EstimatingSurface::new()).paginate(&input)
}

/// Render an author document to its HTML content fragment.
///
/// # Example
///
/// ```
/// let html = pagemark::render_document("# Title\n").unwrap();
/// assert!(html.contains("<h1>Title</h1>"));
/// ```
pub fn render_document(source: &str) -> Result<String> {
    MarkdownContentRenderer::new().render(source)
}

/// Builder for rendering and paginating documents.
///
/// # Example
///
/// ```
/// use pagemark::{Pagemark, PageFormat, ThemeTokens};
///
/// let json = Pagemark::new()
///     .with_format(PageFormat::A4)
///     .with_theme(ThemeTokens::default().with_font_size(11.0))
///     .with_author_css(".cv-container h2 { text-transform: uppercase; }")
///     .render("## Skills\n\nRust\n")?
///     .to_json(false)?;
/// assert!(json.starts_with("{\"pages\":"));
/// # Ok::<(), pagemark::Error>(())
/// ```
pub struct Pagemark {
    format: PageFormat,
    theme: ThemeTokens,
    author_css: String,
    renderer: Box<dyn ContentRenderer>,
}

impl Pagemark {
    /// Create a new Pagemark builder.
    pub fn new() -> Self {
        Self {
            format: PageFormat::default(),
            theme: ThemeTokens::default(),
            author_css: String::new(),
            renderer: Box::new(MarkdownContentRenderer::new()),
        }
    }

    /// Set page format.
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set theme tokens.
    pub fn with_theme(mut self, theme: ThemeTokens) -> Self {
        self.theme = theme;
        self
    }

    /// Set author CSS.
    pub fn with_author_css(mut self, css: impl Into<String>) -> Self {
        self.author_css = css.into();
        self
    }

    /// Use a different content renderer.
    pub fn with_renderer(mut self, renderer: impl ContentRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Render `source` and paginate the result.
    pub fn render(self, source: &str) -> Result<PagemarkResult> {
        self.theme.validate()?;
        let html = self.renderer.render(source)?;
        log::debug!(
            "rendered {} bytes of content with the {} renderer",
            html.len(),
            self.renderer.name()
        );
        let input = PageInput::new(html)
            .with_format(self.format)
            .with_theme(self.theme)
            .with_author_css(self.author_css);
        let pagination = Paginator::new(EstimatingSurface::new()).paginate(&input);
        Ok(PagemarkResult { input, pagination })
    }
}

impl Default for Pagemark {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of rendering and paginating a document.
pub struct PagemarkResult {
    /// The paginated input
    pub input: PageInput,
    pagination: Pagination,
}

impl PagemarkResult {
    /// Get the pages.
    pub fn pages(&self) -> &Pagination {
        &self.pagination
    }

    /// Rendered content fragment before pagination.
    pub fn html(&self) -> &str {
        &self.input.html
    }

    /// Assemble the pages for print.
    pub fn to_print_document(&self) -> PrintDocument {
        assemble_for_print(
            &self.pagination.pages,
            self.input.format,
            &self.input.theme,
            &self.input.author_css,
        )
    }

    /// Convert the pages to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.pagination)?
        } else {
            serde_json::to_string(&self.pagination)?
        };
        Ok(json)
    }

    /// Consume the result and return the pages.
    pub fn into_pagination(self) -> Pagination {
        self.pagination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagemark_builder() {
        let builder = Pagemark::new()
            .with_format(PageFormat::Letter)
            .with_author_css(".cv-container p {}");
        assert_eq!(builder.format, PageFormat::Letter);
        assert_eq!(builder.theme, ThemeTokens::default());
        assert_eq!(builder.renderer.name(), "markdown");
    }

    #[test]
    fn test_pagemark_builder_default() {
        let builder = Pagemark::default();
        assert_eq!(builder.format, PageFormat::A4);
        assert!(builder.author_css.is_empty());
    }

    #[test]
    fn test_render_rejects_invalid_theme() {
        let result = Pagemark::new()
            .with_theme(ThemeTokens::default().with_font_size(0.0))
            .render("text");
        assert!(matches!(result, Err(Error::InvalidTheme(_))));
    }

    #[test]
    fn test_render_propagates_frontmatter_errors() {
        let result = Pagemark::new().render("---\nname: Jane\n");
        assert!(matches!(result, Err(Error::Frontmatter(_))));
    }

    #[test]
    fn test_short_document_is_one_page() {
        let result = Pagemark::new().render("# Jane\n\nShort.\n").unwrap();
        assert_eq!(result.pages().page_count(), 1);
        assert_eq!(result.pages().pages[0], result.html());
    }

    #[test]
    fn test_long_document_splits() {
        let source: String = (0..120)
            .map(|i| format!("## Section {}\n\nSome paragraph text for section {}.\n\n", i, i))
            .collect();
        let result = Pagemark::new().render(&source).unwrap();
        let pages = result.pages();
        assert!(pages.page_count() > 1);
        assert!(!pages.is_degraded());
        assert!(pages.iter().all(|p| p.starts_with("<div>") && p.ends_with("</div>")));

        let print = result.to_print_document();
        assert_eq!(print.page_count(), pages.page_count());
    }

    #[test]
    fn test_author_css_moves_page_breaks() {
        let source: String = (0..30)
            .map(|i| format!("## Section {}\n\nA short paragraph for section {}.\n\n", i, i))
            .collect();
        let plain = Pagemark::new().render(&source).unwrap();
        let styled = Pagemark::new()
            .with_author_css(".cv-container h2 { font-size: 80px; margin-top: 200px; }")
            .render(&source)
            .unwrap();

        assert!(!styled.pages().is_degraded());
        assert!(styled.pages().page_count() > plain.pages().page_count());
    }

    #[test]
    fn test_empty_document() {
        assert!(paginate_html("", PageFormat::A4, &ThemeTokens::default(), "").is_empty());
        assert!(Pagemark::new().render("").unwrap().pages().is_empty());
        assert!(Pagemark::new().render("---\n---\n").unwrap().pages().is_empty());
        assert_eq!(Pagemark::new().render("\n\n").unwrap().to_print_document().page_count(), 0);
    }

    #[test]
    fn test_to_json() {
        let result = Pagemark::new().render("Hi\n").unwrap();
        let json = result.to_json(false).unwrap();
        assert_eq!(
            json,
            "{\"pages\":[\"<div class=\\\"cv-container\\\"><p>Hi</p></div>\"]}"
        );
    }
}
