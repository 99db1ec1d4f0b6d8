//! The layout-affecting subset of a surface stylesheet.
//!
//! Only declarations that change block heights are read: `font-size`,
//! `line-height`, `margin`, `margin-top`, `margin-bottom` and `display`.
//! Selectors are matched when they are chains of tag and class compounds
//! joined by descendant or child combinators; anything else (ids,
//! attributes, pseudo-classes, sibling combinators) is skipped, as are rules
//! inside at-rule blocks.

use crate::style::ROOT_FONT_SIZE_PX;
use regex::Regex;

/// Line height a browser uses for `line-height: normal`.
const NORMAL_LINE_HEIGHT: f32 = 1.2;

/// CSS pixels per point.
const PX_PER_PT: f32 = 96.0 / 72.0;

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Length {
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
}

impl Length {
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let length = if let Some(n) = value.strip_suffix("rem") {
            Length::Rem(n.trim().parse().ok()?)
        } else if let Some(n) = value.strip_suffix("em") {
            Length::Em(n.trim().parse().ok()?)
        } else if let Some(n) = value.strip_suffix("px") {
            Length::Px(n.trim().parse().ok()?)
        } else if let Some(n) = value.strip_suffix("pt") {
            Length::Px(n.trim().parse::<f32>().ok()? * PX_PER_PT)
        } else if let Some(n) = value.strip_suffix('%') {
            Length::Percent(n.trim().parse().ok()?)
        } else if value == "0" || value == "auto" {
            Length::Px(0.0)
        } else {
            return None;
        };
        match length {
            Length::Px(v) | Length::Em(v) | Length::Rem(v) | Length::Percent(v) if v.is_finite() => {
                Some(length)
            }
            _ => None,
        }
    }

    /// Resolve to pixels; `em` and `%` are relative to `font_px`.
    pub(crate) fn to_px(self, font_px: f32) -> f32 {
        match self {
            Length::Px(v) => v,
            Length::Em(v) => v * font_px,
            Length::Rem(v) => v * ROOT_FONT_SIZE_PX,
            Length::Percent(v) => v / 100.0 * font_px,
        }
    }
}

/// A `line-height` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LineHeight {
    /// Unitless multiplier, inherited as a multiplier
    Factor(f32),
    /// Length, inherited as the computed pixel value
    Length(Length),
}

impl LineHeight {
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("normal") {
            return Some(LineHeight::Factor(NORMAL_LINE_HEIGHT));
        }
        match value.parse::<f32>() {
            Ok(factor) if factor.is_finite() && factor >= 0.0 => Some(LineHeight::Factor(factor)),
            Ok(_) => None,
            Err(_) => Length::parse(value).map(LineHeight::Length),
        }
    }

    /// Computed value for an element whose font size is `font_px`.
    pub(crate) fn computed(self, font_px: f32) -> Self {
        match self {
            LineHeight::Length(length) => LineHeight::Length(Length::Px(length.to_px(font_px))),
            factor => factor,
        }
    }

    /// Line box height in pixels at `font_px`.
    pub(crate) fn to_px(self, font_px: f32) -> f32 {
        match self {
            LineHeight::Factor(factor) => factor * font_px,
            LineHeight::Length(length) => length.to_px(font_px),
        }
    }
}

/// Layout-affecting declarations of one rule, or the cascaded result for one
/// element.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Declarations {
    pub font_size: Option<Length>,
    pub line_height: Option<LineHeight>,
    pub margin_top: Option<Length>,
    pub margin_bottom: Option<Length>,
    pub hidden: Option<bool>,
}

impl Declarations {
    fn parse(body: &str) -> Self {
        let mut out = Self::default();
        for declaration in body.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map_or(value, str::trim_end);

            match name.as_str() {
                "font-size" => out.font_size = Length::parse(value).or(out.font_size),
                "line-height" => out.line_height = LineHeight::parse(value).or(out.line_height),
                "margin-top" => out.margin_top = margin(value).or(out.margin_top),
                "margin-bottom" => out.margin_bottom = margin(value).or(out.margin_bottom),
                "margin" => {
                    let sides: Vec<&str> = value.split_whitespace().collect();
                    let (top, bottom) = match sides.len() {
                        1 | 2 => (sides[0], sides[0]),
                        3 | 4 => (sides[0], sides[2]),
                        _ => continue,
                    };
                    out.margin_top = margin(top).or(out.margin_top);
                    out.margin_bottom = margin(bottom).or(out.margin_bottom);
                }
                "display" => out.hidden = Some(value.eq_ignore_ascii_case("none")),
                _ => {}
            }
        }
        out
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&mut self, later: &Declarations) {
        if later.font_size.is_some() {
            self.font_size = later.font_size;
        }
        if later.line_height.is_some() {
            self.line_height = later.line_height;
        }
        if later.margin_top.is_some() {
            self.margin_top = later.margin_top;
        }
        if later.margin_bottom.is_some() {
            self.margin_bottom = later.margin_bottom;
        }
        if later.hidden.is_some() {
            self.hidden = later.hidden;
        }
    }
}

/// A vertical margin. Percentages refer to the containing block width and
/// are not read.
fn margin(value: &str) -> Option<Length> {
    Length::parse(value).filter(|length| !matches!(length, Length::Percent(_)))
}

/// An element as seen by selector matching.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementRef<'a> {
    pub tag: &'a str,
    pub classes: &'a [String],
}

/// A tag and class compound such as `li.item`.
#[derive(Debug, Clone, PartialEq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.tag.as_deref().map_or(true, |tag| tag == element.tag)
            && self
                .classes
                .iter()
                .all(|class| element.classes.iter().any(|c| c == class))
    }
}

#[derive(Debug, Clone)]
struct Selector {
    /// Ancestor compounds, outermost first
    ancestors: Vec<Compound>,
    subject: Compound,
    specificity: (usize, usize),
}

impl Selector {
    fn matches(&self, element: &ElementRef<'_>, ancestors: &[ElementRef<'_>]) -> bool {
        if !self.subject.matches(element) {
            return false;
        }
        let mut remaining = ancestors.iter().rev();
        self.ancestors
            .iter()
            .rev()
            .all(|compound| remaining.any(|ancestor| compound.matches(ancestor)))
    }
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    declarations: Declarations,
}

/// Rules read from a surface stylesheet, in source order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cascade {
    rules: Vec<Rule>,
}

/// Reads layout rules out of CSS text.
struct CascadeParser {
    comment: Regex,
    rule: Regex,
    compound: Regex,
}

impl CascadeParser {
    fn new() -> Self {
        Self {
            comment: Regex::new(r"(?s)/\*.*?\*/").unwrap(),
            rule: Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap(),
            compound: Regex::new(r"^([A-Za-z][A-Za-z0-9-]*|\*)?((?:\.[A-Za-z_-][A-Za-z0-9_-]*)*)$")
                .unwrap(),
        }
    }

    fn parse(&self, css: &str) -> Cascade {
        let css = self.comment.replace_all(css, "");
        let css = strip_at_rules(&css);

        let mut rules = Vec::new();
        for caps in self.rule.captures_iter(&css) {
            let declarations = Declarations::parse(&caps[2]);
            if declarations.is_empty() {
                continue;
            }
            for part in caps[1].split(',') {
                if let Some(selector) = self.selector(part) {
                    rules.push(Rule {
                        selector,
                        declarations: declarations.clone(),
                    });
                }
            }
        }
        Cascade { rules }
    }

    fn selector(&self, text: &str) -> Option<Selector> {
        if text.contains(['#', '[', ':', '+', '~', '(']) {
            return None;
        }
        let mut compounds = text
            .replace('>', " ")
            .split_whitespace()
            .map(|part| self.compound(part))
            .collect::<Option<Vec<_>>>()?;
        let subject = compounds.pop()?;

        let all = compounds.iter().chain([&subject]);
        let classes: usize = all.clone().map(|c| c.classes.len()).sum();
        let tags = all.filter(|c| c.tag.is_some()).count();
        Some(Selector {
            ancestors: compounds,
            subject,
            specificity: (classes, tags),
        })
    }

    fn compound(&self, text: &str) -> Option<Compound> {
        let caps = self.compound.captures(text)?;
        let tag = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|tag| tag != "*");
        let classes: Vec<String> = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .split('.')
            .filter(|class| !class.is_empty())
            .map(str::to_string)
            .collect();
        if tag.is_none() && classes.is_empty() && text != "*" {
            return None;
        }
        Some(Compound { tag, classes })
    }
}

impl Cascade {
    /// Read the layout rules of `css`.
    pub(crate) fn parse(css: &str) -> Self {
        CascadeParser::new().parse(css)
    }

    /// Cascaded declarations for `element` under `ancestors` (outermost
    /// first). More specific rules win; ties go to the later rule.
    pub(crate) fn declarations(
        &self,
        element: &ElementRef<'_>,
        ancestors: &[ElementRef<'_>],
    ) -> Declarations {
        let mut matched: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(element, ancestors))
            .collect();
        matched.sort_by_key(|rule| rule.selector.specificity);

        let mut out = Declarations::default();
        for rule in matched {
            out.apply(&rule.declarations);
        }
        out
    }
}

/// Class names of a surface selector such as `.pagemark-measure`.
pub(crate) fn selector_classes(selector: &str) -> Vec<String> {
    selector
        .trim()
        .split('.')
        .skip(1)
        .filter(|class| !class.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove `@` statements and at-rule blocks (with their nested rules).
fn strip_at_rules(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        let end = match tail.find(['{', ';']) {
            Some(i) if tail.as_bytes()[i] == b';' => i + 1,
            Some(i) => block_end(tail, i),
            None => tail.len(),
        };
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Byte offset just past the `}` matching the `{` at `open`.
fn block_end(text: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(tag: &'a str, classes: &'a [String]) -> ElementRef<'a> {
        ElementRef { tag, classes }
    }

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_lengths() {
        assert_eq!(Length::parse("12px"), Some(Length::Px(12.0)));
        assert_eq!(Length::parse("1.5rem"), Some(Length::Rem(1.5)));
        assert_eq!(Length::parse(".5em"), Some(Length::Em(0.5)));
        assert_eq!(Length::parse("150%"), Some(Length::Percent(150.0)));
        assert_eq!(Length::parse("0"), Some(Length::Px(0.0)));
        assert!((Length::parse("12pt").unwrap().to_px(0.0) - 16.0).abs() < 1e-4);
        assert_eq!(Length::parse("larger"), None);
        assert_eq!(Length::Em(2.0).to_px(10.0), 20.0);
        assert_eq!(Length::Rem(2.0).to_px(10.0), 32.0);
    }

    #[test]
    fn test_line_height_values() {
        assert_eq!(LineHeight::parse("1.4"), Some(LineHeight::Factor(1.4)));
        assert_eq!(LineHeight::parse("normal"), Some(LineHeight::Factor(1.2)));
        assert_eq!(
            LineHeight::parse("2em").map(|lh| lh.computed(10.0)),
            Some(LineHeight::Length(Length::Px(20.0)))
        );
        assert_eq!(LineHeight::Factor(1.5).to_px(10.0), 15.0);
    }

    #[test]
    fn test_margin_shorthand() {
        let d = Declarations::parse("margin: 1px 2px 3px 4px; color: red");
        assert_eq!(d.margin_top, Some(Length::Px(1.0)));
        assert_eq!(d.margin_bottom, Some(Length::Px(3.0)));
        let d = Declarations::parse("margin: 0 auto; display: none !important");
        assert_eq!(d.margin_top, Some(Length::Px(0.0)));
        assert_eq!(d.hidden, Some(true));
        let d = Declarations::parse("margin-top: 10%; margin-bottom: 2em");
        assert!(d.margin_top.is_none());
        assert_eq!(d.margin_bottom, Some(Length::Em(2.0)));
    }

    #[test]
    fn test_descendant_matching() {
        let cascade = Cascade::parse(
            ".page h2 { font-size: 20px; }\n.page .intro p { margin-top: 0; }",
        );
        let root = classes(&["page"]);
        let intro = classes(&["intro"]);
        let none: Vec<String> = Vec::new();

        let h2 = cascade.declarations(&element("h2", &none), &[element("div", &root)]);
        assert_eq!(h2.font_size, Some(Length::Px(20.0)));

        let outside = cascade.declarations(&element("p", &none), &[element("div", &root)]);
        assert!(outside.margin_top.is_none());

        let inside = cascade.declarations(
            &element("p", &none),
            &[element("div", &root), element("section", &intro)],
        );
        assert_eq!(inside.margin_top, Some(Length::Px(0.0)));
    }

    #[test]
    fn test_specificity_then_order() {
        let cascade = Cascade::parse(
            ".s .big { font-size: 30px; }\n.s p { font-size: 10px; }\n.s p { font-size: 11px; }",
        );
        let root = classes(&["s"]);
        let big = classes(&["big"]);
        let none: Vec<String> = Vec::new();

        let plain = cascade.declarations(&element("p", &none), &[element("div", &root)]);
        assert_eq!(plain.font_size, Some(Length::Px(11.0)));
        let classed = cascade.declarations(&element("p", &big), &[element("div", &root)]);
        assert_eq!(classed.font_size, Some(Length::Px(30.0)));
    }

    #[test]
    fn test_unsupported_selectors_and_at_rules_are_skipped() {
        let cascade = Cascade::parse(
            "/* p { font-size: 1px; } */\n@import url(x.css);\n@media print { p { font-size: 2px; } }\n\
             p:first-child { font-size: 3px; }\n#id { font-size: 4px; }\n, p { font-size: 5px; }",
        );
        let none: Vec<String> = Vec::new();
        let p = cascade.declarations(&element("p", &none), &[]);
        assert_eq!(p.font_size, Some(Length::Px(5.0)));
    }

    #[test]
    fn test_selector_classes() {
        assert_eq!(selector_classes(".pagemark-measure"), classes(&["pagemark-measure"]));
        assert!(selector_classes("#root").is_empty());
    }
}
