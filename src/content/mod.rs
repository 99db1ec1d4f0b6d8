//! Content rendering: author document source to one HTML fragment.
//!
//! The pagination engine treats the renderer as a black box; any type
//! implementing [`ContentRenderer`] can feed it. The default
//! [`MarkdownContentRenderer`] handles `---` fenced YAML frontmatter followed
//! by a CommonMark/GFM body.
//!
//! # Example
//!
//! ```
//! use pagemark::content::{ContentRenderer, MarkdownContentRenderer};
//!
//! let source = "---\nname: Jane Doe\nheader:\n  - text: Berlin\n---\n## Experience\n";
//! let html = MarkdownContentRenderer::new().render(source).unwrap();
//! assert!(html.starts_with("<div class=\"cv-container\">"));
//! assert!(html.contains("<h1>Jane Doe</h1>"));
//! ```

mod frontmatter;

pub use frontmatter::{split_frontmatter, Frontmatter, HeaderItem, SplitSource};

use crate::error::Result;
use quick_xml::escape::escape;

/// Class of the single root element wrapping rendered content.
pub const CONTENT_ROOT_CLASS: &str = "cv-container";

/// Converts an author document into one HTML fragment.
pub trait ContentRenderer: Send + Sync {
    /// Name of this renderer.
    fn name(&self) -> &str;

    /// Render `source` into an HTML fragment.
    fn render(&self, source: &str) -> Result<String>;
}

/// Markdown-plus-frontmatter renderer backed by comrak.
#[derive(Debug, Clone)]
pub struct MarkdownContentRenderer {
    gfm: bool,
}

impl MarkdownContentRenderer {
    /// Create a renderer with GitHub-flavoured extensions enabled.
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub-flavoured extensions (tables, strikethrough,
    /// autolinks, task lists).
    pub fn with_gfm(mut self, gfm: bool) -> Self {
        self.gfm = gfm;
        self
    }

    fn render_markdown(&self, body: &str) -> String {
        let mut options = comrak::Options::default();
        if self.gfm {
            options.extension.table = true;
            options.extension.strikethrough = true;
            options.extension.autolink = true;
            options.extension.tasklist = true;
        }
        comrak::markdown_to_html(body, &options)
    }
}

impl Default for MarkdownContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for MarkdownContentRenderer {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(&self, source: &str) -> Result<String> {
        let split = split_frontmatter(source)?;
        let frontmatter = match split.frontmatter {
            Some(yaml) => Frontmatter::parse(yaml)?,
            None => Frontmatter::default(),
        };

        let body = self.render_markdown(split.body);
        let body = body.trim_end();
        if frontmatter.is_empty() && body.is_empty() {
            return Ok(String::new());
        }

        let mut html = String::with_capacity(source.len() * 2);
        html.push_str("<div class=\"");
        html.push_str(CONTENT_ROOT_CLASS);
        html.push_str("\">");
        if !frontmatter.is_empty() {
            html.push_str(&render_header(&frontmatter));
        }
        html.push_str(body);
        html.push_str("</div>");
        Ok(html)
    }
}

/// Render the frontmatter header block.
fn render_header(frontmatter: &Frontmatter) -> String {
    let mut out = String::from("<header class=\"cv-header\">");
    if let Some(name) = frontmatter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str("<h1>");
        out.push_str(&escape(name.trim()));
        out.push_str("</h1>");
    }
    if !frontmatter.header.is_empty() {
        let items = frontmatter
            .header
            .iter()
            .map(|item| match item.link.as_deref() {
                Some(link) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape(link),
                    escape(item.text.as_str())
                ),
                None => escape(item.text.as_str()).into_owned(),
            })
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str("<p class=\"cv-header-items\">");
        out.push_str(&items);
        out.push_str("</p>");
    }
    out.push_str("</header>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::split_blocks;

    #[test]
    fn test_render_without_frontmatter() {
        let html = MarkdownContentRenderer::new()
            .render("# Title\n\nBody text.\n")
            .unwrap();
        assert_eq!(
            html,
            "<div class=\"cv-container\"><h1>Title</h1>\n<p>Body text.</p></div>"
        );
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let renderer = MarkdownContentRenderer::new();
        assert_eq!(renderer.render("").unwrap(), "");
        assert_eq!(renderer.render("  \n\n").unwrap(), "");
        assert_eq!(renderer.render("---\nname: \"  \"\n---\n\n").unwrap(), "");
        assert!(!renderer.render("---\nname: Jane\n---\n").unwrap().is_empty());
    }

    #[test]
    fn test_header_is_escaped() {
        let source = "---\nname: \"A <B> & C\"\nheader:\n  - text: x@y.z\n    link: \"mailto:x@y.z\"\n  - text: Paris\n---\nBody\n";
        let html = MarkdownContentRenderer::new().render(source).unwrap();
        assert!(html.contains("<h1>A &lt;B&gt; &amp; C</h1>"));
        assert!(html.contains(
            "<p class=\"cv-header-items\"><a href=\"mailto:x@y.z\">x@y.z</a> | Paris</p>"
        ));
    }

    #[test]
    fn test_rendered_blocks_split_below_root() {
        let source = "---\nname: Jane\n---\n## One\n\nText\n\n- a\n- b\n";
        let html = MarkdownContentRenderer::new().render(source).unwrap();
        let blocks = split_blocks(&html).unwrap();
        assert_eq!(blocks.wrappers, vec!["div".to_string()]);
        let tags: Vec<_> = blocks
            .units
            .iter()
            .filter_map(|u| u.tag.as_deref())
            .collect();
        assert_eq!(tags, vec!["header", "h2", "p", "ul"]);
    }

    #[test]
    fn test_gfm_tables() {
        let source = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let with = MarkdownContentRenderer::new().render(source).unwrap();
        assert!(with.contains("<table>"));
        let without = MarkdownContentRenderer::new()
            .with_gfm(false)
            .render(source)
            .unwrap();
        assert!(!without.contains("<table>"));
    }
}
