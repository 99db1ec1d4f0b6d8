//! Line-oriented scoping of author CSS.
//!
//! Author stylesheets target a generic content-root marker
//! ([`CONTENT_ROOT_MARKER`]) and bare class selectors. Scoping rewrites them
//! so they apply under one concrete surface selector.
//!
//! This is a textual transform, not a CSS parser. Known limitation: selectors
//! spanning several lines and nested rules (`@media` blocks whose inner
//! selectors are indented class selectors excepted) are not understood and
//! may produce CSS that silently fails to apply.

use regex::Regex;

/// Generic content-root marker used by author CSS.
pub const CONTENT_ROOT_MARKER: &str = ".cv-container";

/// Rewrites author CSS into CSS scoped under a selector.
pub struct CssScoper {
    class_line: Regex,
}

impl CssScoper {
    /// Create a new scoper.
    pub fn new() -> Self {
        Self {
            class_line: Regex::new(r"^(\s*)(\.[^{]*?)(\s*\{.*|\s*,\s*)?$").unwrap(),
        }
    }

    /// Scope `css` under `selector`, line by line.
    pub fn scope(&self, css: &str, selector: &str) -> String {
        css.lines()
            .map(|line| self.scope_line(line, selector))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn scope_line(&self, line: &str, selector: &str) -> String {
        if line.contains(CONTENT_ROOT_MARKER) {
            return line.replace(CONTENT_ROOT_MARKER, selector);
        }

        let Some(caps) = self.class_line.captures(line) else {
            return line.to_string();
        };
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let selectors = caps.get(2).map_or("", |m| m.as_str());
        let rest = caps.get(3).map_or("", |m| m.as_str());

        let scoped = selectors
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                if part.starts_with('.') {
                    format!("{} {}", selector, part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}{}{}", indent, scoped, rest)
    }
}

impl Default for CssScoper {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope author CSS under `selector`.
pub fn scope_author_css(css: &str, selector: &str) -> String {
    CssScoper::new().scope(css, selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_replaced() {
        let css = ".cv-container h1 { color: red; }";
        assert_eq!(
            scope_author_css(css, ".preview-page"),
            ".preview-page h1 { color: red; }"
        );
    }

    #[test]
    fn test_class_lines_are_prefixed() {
        let css = ".skills {\n  display: flex;\n}\n.tag, .badge {\n  color: blue;\n}";
        let scoped = scope_author_css(css, "#measure");
        assert_eq!(
            scoped,
            "#measure .skills {\n  display: flex;\n}\n#measure .tag, #measure .badge {\n  color: blue;\n}"
        );
    }

    #[test]
    fn test_non_selector_lines_pass_through() {
        let css = "h2 {\n  margin: 0;\n}\n  /* note */\n@media print {\n}";
        assert_eq!(scope_author_css(css, ".s"), css);
    }

    #[test]
    fn test_indentation_is_kept() {
        let css = "@media print {\n  .header { display: none; }\n}";
        assert_eq!(
            scope_author_css(css, ".p"),
            "@media print {\n  .p .header { display: none; }\n}"
        );
    }

    #[test]
    fn test_decimal_values_are_not_selectors() {
        // declarations never start with a dot, so `.5em` inside one is left alone
        let css = "  padding: .5em;";
        assert_eq!(scope_author_css(css, ".s"), css);
    }
}
