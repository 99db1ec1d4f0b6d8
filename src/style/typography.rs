//! Typography projection: theme tokens to scoped CSS text.

use crate::model::ThemeTokens;
use std::fmt::Write;

/// Root font size that `rem` units resolve against.
pub const ROOT_FONT_SIZE_PX: f32 = 16.0;

/// Per-element typography multipliers.
///
/// `font_scale` multiplies the theme font size; margins multiply the theme
/// paragraph spacing and are expressed in rem. `None` leaves the margin to
/// the user agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRule {
    /// Element kinds the rule applies to
    pub kinds: &'static [&'static str],
    /// Font size multiplier
    pub font_scale: f32,
    /// Top margin multiplier (rem)
    pub margin_top: Option<f32>,
    /// Bottom margin multiplier (rem)
    pub margin_bottom: Option<f32>,
}

impl ElementRule {
    const fn new(
        kinds: &'static [&'static str],
        font_scale: f32,
        margin_top: Option<f32>,
        margin_bottom: Option<f32>,
    ) -> Self {
        Self {
            kinds,
            font_scale,
            margin_top,
            margin_bottom,
        }
    }

    /// Check if this rule styles the given (lowercase) tag.
    pub fn applies_to(&self, tag: &str) -> bool {
        self.kinds.contains(&tag)
    }
}

/// The element table shared by the preview, measurement and print surfaces.
pub const ELEMENT_RULES: &[ElementRule] = &[
    ElementRule::new(&["h1"], 1.8, Some(0.0), Some(1.0)),
    ElementRule::new(&["h2"], 1.4, Some(1.5), Some(0.5)),
    ElementRule::new(&["h3"], 1.2, Some(1.2), Some(0.4)),
    ElementRule::new(&["p"], 1.0, None, Some(0.8)),
    ElementRule::new(&["li"], 1.0, None, Some(0.3)),
    ElementRule::new(&["a", "strong", "em"], 1.0, None, None),
    ElementRule::new(&["ul", "ol", "dl"], 1.0, None, Some(1.0)),
];

/// Find the typography rule for a tag, if any.
pub fn rule_for(tag: &str) -> Option<&'static ElementRule> {
    ELEMENT_RULES.iter().find(|rule| rule.applies_to(tag))
}

/// Project theme tokens into CSS anchored at `selector`.
///
/// The output for two selectors and the same theme differs only in the
/// selector prefix of each rule.
pub fn project_typography(theme: &ThemeTokens, selector: &str) -> String {
    let mut css = String::with_capacity(1024);
    let line_height = fmt_num(theme.line_height);

    let _ = writeln!(css, "{} {{", selector);
    let _ = writeln!(css, "  color: {};", theme.color);
    let _ = writeln!(css, "  font-size: {}px;", fmt_num(theme.font_size));
    let _ = writeln!(css, "  line-height: {};", line_height);
    css.push_str("}\n");

    for rule in ELEMENT_RULES {
        let selectors = rule
            .kinds
            .iter()
            .map(|kind| format!("{} {}", selector, kind))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(css, "{} {{", selectors);
        let _ = writeln!(css, "  color: {};", theme.color);
        let _ = writeln!(
            css,
            "  font-size: {}px;",
            fmt_num(theme.font_size * rule.font_scale)
        );
        let _ = writeln!(css, "  line-height: {};", line_height);
        if let Some(top) = rule.margin_top {
            let _ = writeln!(
                css,
                "  margin-top: {}rem;",
                fmt_num(theme.paragraph_spacing * top)
            );
        }
        if let Some(bottom) = rule.margin_bottom {
            let _ = writeln!(
                css,
                "  margin-bottom: {}rem;",
                fmt_num(theme.paragraph_spacing * bottom)
            );
        }
        css.push_str("}\n");
    }

    css
}

/// Format a CSS number with at most four decimals and no trailing zeros.
pub(crate) fn fmt_num(value: f32) -> String {
    let rounded = (value as f64 * 10_000.0).round() / 10_000.0;
    let mut out = format!("{:.4}", rounded);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out
}
