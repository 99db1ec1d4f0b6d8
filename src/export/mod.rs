//! Print export: page fragments to a print-ready document.
//!
//! Export owns no pagination logic. It takes the fragments produced by the
//! engine, gives each its own page block with a forced break after it, and
//! re-applies the same typography under a print-only scope.
//!
//! # Example
//!
//! ```
//! use pagemark::export::assemble_for_print;
//! use pagemark::{PageFormat, ThemeTokens};
//!
//! let pages = vec!["<p>one</p>".to_string(), "<p>two</p>".to_string()];
//! let doc = assemble_for_print(&pages, PageFormat::A4, &ThemeTokens::default(), "");
//! assert_eq!(doc.page_count(), 2);
//! assert!(doc.to_standalone_html().contains("@page { size: A4; margin: 0; }"));
//! ```

use crate::error::Result;
use crate::model::{PageFormat, ThemeTokens};
use crate::style::{fmt_num, project_stylesheet, PRINT_SELECTOR};
use std::fmt::Write;
use std::time::Duration;

/// Class of the element holding all printed pages.
pub const PRINT_ROOT_CLASS: &str = "pagemark-print-root";

/// A print-ready document: one page block per fragment plus its stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    /// Page format the document prints on
    pub format: PageFormat,

    /// Print-scoped stylesheet
    pub stylesheet: String,

    /// Print root element holding one block per page
    pub body: String,

    pages: usize,
}

impl PrintDocument {
    /// Number of physical pages this document prints.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Render a complete HTML document suitable for opening and printing.
    pub fn to_standalone_html(&self) -> String {
        let mut out = String::with_capacity(self.stylesheet.len() + self.body.len() + 256);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<style>\n");
        out.push_str(&self.stylesheet);
        out.push_str("</style>\n</head>\n<body>\n");
        out.push_str(&self.body);
        out.push_str("\n</body>\n</html>\n");
        out
    }
}

/// Build the print document for `pages`.
///
/// Every fragment is wrapped in a page-boundary block; a page break is forced
/// after every page except the last. Typography and scoped author CSS are
/// emitted inside `@media print` so they never affect on-screen rendering.
pub fn assemble_for_print(
    pages: &[String],
    format: PageFormat,
    theme: &ThemeTokens,
    author_css: &str,
) -> PrintDocument {
    let geometry = format.geometry();
    let page_class = PRINT_SELECTOR.trim_start_matches('.');

    let mut css = String::new();
    let _ = writeln!(css, "@media screen {{");
    let _ = writeln!(css, "  .{} {{ display: none; }}", PRINT_ROOT_CLASS);
    let _ = writeln!(css, "}}");
    let _ = writeln!(css, "@media print {{");
    let _ = writeln!(css, "@page {{ size: {}; margin: 0; }}", format.name());
    let _ = writeln!(css, "{} {{", PRINT_SELECTOR);
    let _ = writeln!(css, "  box-sizing: border-box;");
    let _ = writeln!(css, "  width: {}mm;", geometry.width_mm);
    let _ = writeln!(css, "  height: {}mm;", geometry.height_mm);
    let _ = writeln!(css, "  padding: {}px;", fmt_num(theme.page_padding));
    let _ = writeln!(css, "  overflow: hidden;");
    let _ = writeln!(css, "  break-after: page;");
    let _ = writeln!(css, "  page-break-after: always;");
    let _ = writeln!(css, "}}");
    let _ = writeln!(css, "{}:last-child {{", PRINT_SELECTOR);
    let _ = writeln!(css, "  break-after: auto;");
    let _ = writeln!(css, "  page-break-after: auto;");
    let _ = writeln!(css, "}}");
    css.push_str(&project_stylesheet(theme, PRINT_SELECTOR, author_css));
    let _ = writeln!(css, "}}");

    let mut body = String::new();
    let _ = write!(body, "<div class=\"{}\">", PRINT_ROOT_CLASS);
    for (index, page) in pages.iter().enumerate() {
        let _ = write!(
            body,
            "<section class=\"{}\" data-page=\"{}\">",
            page_class,
            index + 1
        );
        body.push_str(page);
        body.push_str("</section>");
    }
    body.push_str("</div>");

    log::debug!("assembled {} page(s) for {} print", pages.len(), format);

    PrintDocument {
        format,
        stylesheet: css,
        body,
        pages: pages.len(),
    }
}

/// Options for the print flow.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// How long injected scaffolding stays after the print call returns
    pub cleanup_delay: Duration,
}

impl ExportOptions {
    /// Create export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cleanup delay.
    pub fn with_cleanup_delay(mut self, delay: Duration) -> Self {
        self.cleanup_delay = delay;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cleanup_delay: Duration::from_millis(1000),
        }
    }
}

/// The environment a print document is injected into and printed from.
///
/// Print completion is not observable, so [`print_with`] waits
/// [`ExportOptions::cleanup_delay`] before calling [`remove`](PrintHost::remove).
pub trait PrintHost {
    /// Inject the document's stylesheet and page blocks.
    fn inject(&mut self, document: &PrintDocument) -> Result<()>;

    /// Open the print flow.
    fn print(&mut self) -> Result<()>;

    /// Remove everything [`inject`](PrintHost::inject) added.
    fn remove(&mut self);
}

/// Run the print flow for `document` on `host`.
///
/// Injected scaffolding is removed after the cleanup delay, and immediately
/// if injection or printing fails.
pub fn print_with<H: PrintHost + ?Sized>(
    host: &mut H,
    document: &PrintDocument,
    options: &ExportOptions,
) -> Result<()> {
    let mut guard = Injected { host, armed: true };
    guard.host.inject(document)?;
    guard.host.print()?;

    if !options.cleanup_delay.is_zero() {
        std::thread::sleep(options.cleanup_delay);
    }
    guard.armed = false;
    guard.host.remove();
    Ok(())
}

struct Injected<'h, H: PrintHost + ?Sized> {
    host: &'h mut H,
    armed: bool,
}

impl<H: PrintHost + ?Sized> Drop for Injected<'_, H> {
    fn drop(&mut self) {
        if self.armed {
            self.host.remove();
        }
    }
}
