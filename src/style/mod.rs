//! Style projection for the preview, measurement and print surfaces.
//!
//! All three surfaces must receive CSS projected from the same theme; only
//! the selector differs. Pagination decisions are taken against the
//! measurement surface and consumed by the other two.

mod scope;
mod typography;

pub use scope::{scope_author_css, CssScoper, CONTENT_ROOT_MARKER};
pub use typography::{project_typography, rule_for, ElementRule, ELEMENT_RULES, ROOT_FONT_SIZE_PX};

pub(crate) use typography::fmt_num;

use crate::model::ThemeTokens;

/// Selector of the live preview page content.
pub const PREVIEW_SELECTOR: &str = ".pagemark-page";

/// Selector of the off-screen measurement surface.
pub const MEASURE_SELECTOR: &str = ".pagemark-measure";

/// Selector of one printed page.
pub const PRINT_SELECTOR: &str = ".pagemark-print-page";

/// Full stylesheet for one surface: projected typography followed by the
/// scoped author CSS.
pub fn project_stylesheet(theme: &ThemeTokens, selector: &str, author_css: &str) -> String {
    let mut css = project_typography(theme, selector);
    if !author_css.trim().is_empty() {
        css.push_str(&scope_author_css(author_css, selector));
        css.push('\n');
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_appends_scoped_author_css() {
        let css = project_stylesheet(
            &ThemeTokens::default(),
            MEASURE_SELECTOR,
            ".cv-container .name { font-weight: 700; }",
        );
        assert!(css.starts_with(".pagemark-measure {"));
        assert!(css.ends_with(".pagemark-measure .name { font-weight: 700; }\n"));
    }

    #[test]
    fn test_stylesheet_without_author_css() {
        let theme = ThemeTokens::default();
        assert_eq!(
            project_stylesheet(&theme, PREVIEW_SELECTOR, "  \n"),
            project_typography(&theme, PREVIEW_SELECTOR)
        );
    }
}
