//! Integration tests for typography projection and author CSS scoping.

use pagemark::style::{MEASURE_SELECTOR, PREVIEW_SELECTOR, PRINT_SELECTOR};
use pagemark::{project_stylesheet, project_typography, scope_author_css, ThemeTokens};

fn themes() -> Vec<ThemeTokens> {
    vec![
        ThemeTokens::default(),
        ThemeTokens::new()
            .with_color("rgb(10, 20, 30)")
            .with_font_size(10.5)
            .with_line_height(1.25)
            .with_page_padding(0.0)
            .with_paragraph_spacing(0.75),
        ThemeTokens::new().with_font_size(18.0).with_paragraph_spacing(0.0),
    ]
}

#[test]
fn test_surfaces_differ_only_in_selector() {
    for theme in themes() {
        let preview = project_typography(&theme, PREVIEW_SELECTOR);
        for other in [MEASURE_SELECTOR, PRINT_SELECTOR] {
            let projected = project_typography(&theme, other);
            assert_eq!(projected.replace(other, PREVIEW_SELECTOR), preview);
            assert_ne!(projected, preview);
        }
    }
}

#[test]
fn test_stylesheet_parity_with_author_css() {
    let author = ".cv-container h2 {\n  border-bottom: 1px solid;\n}\n.skills li { display: inline; }\n";
    let theme = ThemeTokens::default();
    let preview = project_stylesheet(&theme, PREVIEW_SELECTOR, author);
    let measure = project_stylesheet(&theme, MEASURE_SELECTOR, author);
    assert_eq!(measure.replace(MEASURE_SELECTOR, PREVIEW_SELECTOR), preview);
}

#[test]
fn test_heading_sizes_follow_multipliers() {
    let css = project_typography(&ThemeTokens::default().with_font_size(10.0), ".page");
    assert!(css.contains(".page h1 {"));
    assert!(css.contains("font-size: 18px;"));
    assert!(css.contains("font-size: 14px;"));
    assert!(css.contains("font-size: 12px;"));
    assert!(css.contains("margin-top: 1.5rem;"));
}

#[test]
fn test_scoping_is_line_oriented() {
    let css = ".cv-container { font-family: serif; }\n.a,\n.b { color: red; }\n@media print {\n  .c { display: none; }\n}\n";
    let scoped = scope_author_css(css, ".pg");
    let lines: Vec<&str> = scoped.lines().collect();
    assert_eq!(lines[0], ".pg { font-family: serif; }");
    assert_eq!(lines[1], ".pg .a,");
    assert_eq!(lines[2], ".pg .b { color: red; }");
    assert_eq!(lines[3], "@media print {");
    assert_eq!(lines[4], "  .pg .c { display: none; }");
    assert_eq!(lines[5], "}");
}
