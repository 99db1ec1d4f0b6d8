//! Top-level block units of a rendered HTML fragment.
//!
//! The tokeniser is non-validating: end-name checks are off, HTML void
//! elements never open a nesting level, and unclosed elements run to the end
//! of the input. Every unit borrows its exact source slice so page fragments
//! reproduce the input markup element for element.

use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check if `tag` (lowercase) is an HTML void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// One top-level unit of assignment: an element or a non-blank text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit<'a> {
    /// Outer markup of the unit, exactly as it appears in the source
    pub markup: &'a str,
    /// Lowercase tag name, `None` for text runs
    pub tag: Option<String>,
    inner: Option<&'a str>,
}

impl<'a> Unit<'a> {
    /// Check if this unit is an element.
    pub fn is_element(&self) -> bool {
        self.tag.is_some()
    }

    /// Markup between the start and end tag, if the element has any.
    pub fn inner(&self) -> Option<&'a str> {
        self.inner
    }
}

/// Units to distribute over pages, plus the wrapper tags peeled off around them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks<'a> {
    /// Units in source order
    pub units: Vec<Unit<'a>>,
    /// Wrapper tag names, outermost first
    pub wrappers: Vec<String>,
}

impl<'a> Blocks<'a> {
    /// Join unit markup into one page fragment, re-wrapped in the wrapper tags.
    pub fn page<'u, I>(&self, units: I) -> String
    where
        I: IntoIterator<Item = &'u str>,
    {
        let mut out = String::new();
        for tag in &self.wrappers {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
        for markup in units {
            out.push_str(markup);
        }
        for tag in self.wrappers.iter().rev() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out
    }
}

/// Split `html` into its top-level units.
pub fn parse_units(html: &str) -> Result<Vec<Unit<'_>>> {
    let bytes = html.as_bytes();
    let mut reader = Reader::from_str(html);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
        config.allow_dangling_amp = true;
    }

    let mut units = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    // (start offset, tag, inner start offset) of the open top-level element
    let mut open: Option<(usize, String, usize)> = None;
    let mut text_start: Option<usize> = None;

    loop {
        let before = position(&reader);
        let event = reader.read_event()?;
        let after = position(&reader);

        match event {
            Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) => {
                if stack.is_empty() && text_start.is_none() {
                    text_start = Some(before);
                }
            }
            Event::Start(e) => {
                let start = markup_start(bytes, before);
                if stack.is_empty() {
                    flush_text(html, &mut text_start, start, &mut units);
                }
                let tag = tag_name(e.name().as_ref());
                if is_void_element(&tag) {
                    if stack.is_empty() {
                        units.push(Unit {
                            markup: &html[start..after],
                            tag: Some(tag),
                            inner: None,
                        });
                    }
                    continue;
                }
                if stack.is_empty() {
                    open = Some((start, tag.clone(), after));
                }
                stack.push(tag);
            }
            Event::Empty(e) => {
                let start = markup_start(bytes, before);
                if stack.is_empty() {
                    flush_text(html, &mut text_start, start, &mut units);
                    units.push(Unit {
                        markup: &html[start..after],
                        tag: Some(tag_name(e.name().as_ref())),
                        inner: None,
                    });
                }
            }
            Event::End(e) => {
                let tag = tag_name(e.name().as_ref());
                let Some(depth) = stack.iter().rposition(|open_tag| *open_tag == tag) else {
                    // stray end tag
                    continue;
                };
                stack.truncate(depth);
                if stack.is_empty() {
                    if let Some((start, tag, inner_start)) = open.take() {
                        let end_tag_start = markup_start(bytes, before).max(inner_start);
                        units.push(Unit {
                            markup: &html[start..after],
                            tag: Some(tag),
                            inner: Some(&html[inner_start..end_tag_start]),
                        });
                    }
                }
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                if stack.is_empty() {
                    let start = markup_start(bytes, before);
                    flush_text(html, &mut text_start, start, &mut units);
                }
            }
            Event::Eof => break,
        }
    }

    if let Some((start, tag, inner_start)) = open.take() {
        log::debug!("unclosed <{}> runs to end of fragment", tag);
        units.push(Unit {
            markup: &html[start..],
            tag: Some(tag),
            inner: Some(&html[inner_start..]),
        });
    } else {
        flush_text(html, &mut text_start, html.len(), &mut units);
    }

    Ok(units)
}

/// Split `html` into page units, descending through single wrapper elements.
///
/// While the unit list is exactly one element that itself contains elements,
/// its children become the units and its tag is remembered as a wrapper.
pub fn split_blocks(html: &str) -> Result<Blocks<'_>> {
    let mut units = parse_units(html)?;
    let mut wrappers = Vec::new();

    while units.len() == 1 && units[0].is_element() {
        let Some(inner) = units[0].inner() else {
            break;
        };
        let children = parse_units(inner)?;
        if !children.iter().any(Unit::is_element) {
            break;
        }
        if let Some(tag) = units[0].tag.clone() {
            log::debug!("descending into single <{}> wrapper", tag);
            wrappers.push(tag);
        }
        units = children;
    }

    Ok(Blocks { units, wrappers })
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

/// Offset of the `<` opening the markup read from `before`.
fn markup_start(bytes: &[u8], before: usize) -> usize {
    if bytes.get(before) == Some(&b'<') {
        before
    } else if before > 0 && bytes.get(before - 1) == Some(&b'<') {
        before - 1
    } else {
        before
    }
}

fn flush_text<'a>(
    html: &'a str,
    text_start: &mut Option<usize>,
    end: usize,
    units: &mut Vec<Unit<'a>>,
) {
    let Some(start) = text_start.take() else {
        return;
    };
    let Some(raw) = html.get(start..end) else {
        return;
    };
    if !raw.trim().is_empty() {
        units.push(Unit {
            markup: raw,
            tag: None,
            inner: None,
        });
    }
}

fn tag_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    let local = name.rsplit(':').next().unwrap_or(&name);
    local.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markups<'a>(units: &[Unit<'a>]) -> Vec<&'a str> {
        units.iter().map(|u| u.markup).collect()
    }

    #[test]
    fn test_top_level_elements() {
        let html = "<h1>Title</h1>\n<p>One <em>two</em></p>\n<ul><li>a</li><li>b</li></ul>";
        let units = parse_units(html).unwrap();
        assert_eq!(
            markups(&units),
            vec![
                "<h1>Title</h1>",
                "<p>One <em>two</em></p>",
                "<ul><li>a</li><li>b</li></ul>"
            ]
        );
        assert_eq!(units[1].tag.as_deref(), Some("p"));
        assert_eq!(units[1].inner(), Some("One <em>two</em>"));
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let html = "<p>a<br>b</p><hr><img src=\"x.png\"/><p>c</p>";
        let units = parse_units(html).unwrap();
        assert_eq!(
            markups(&units),
            vec!["<p>a<br>b</p>", "<hr>", "<img src=\"x.png\"/>", "<p>c</p>"]
        );
        assert_eq!(units[1].inner(), None);
    }

    #[test]
    fn test_text_runs_and_comments() {
        let html = "  loose text <!-- note --> <p>x</p> tail &amp; more ";
        let units = parse_units(html).unwrap();
        assert_eq!(
            markups(&units),
            vec!["  loose text ", "<p>x</p>", " tail &amp; more "]
        );
        assert!(!units[0].is_element());
    }

    #[test]
    fn test_bare_ampersands_are_text() {
        let html = "<p>AT&T</p><p>Q & A</p> R&D";
        let units = parse_units(html).unwrap();
        assert_eq!(markups(&units), vec!["<p>AT&T</p>", "<p>Q & A</p>", " R&D"]);
    }

    #[test]
    fn test_nested_same_name_elements() {
        let html = "<div><div>inner</div></div><div>next</div>";
        let units = parse_units(html).unwrap();
        assert_eq!(
            markups(&units),
            vec!["<div><div>inner</div></div>", "<div>next</div>"]
        );
    }

    #[test]
    fn test_unclosed_element_runs_to_end() {
        let units = parse_units("<p>a</p><div>b").unwrap();
        assert_eq!(markups(&units), vec!["<p>a</p>", "<div>b"]);
    }

    #[test]
    fn test_descends_single_wrapper() {
        let html = "<div class=\"cv-container\"><header>h</header><p>a</p></div>";
        let blocks = split_blocks(html).unwrap();
        assert_eq!(blocks.wrappers, vec!["div".to_string()]);
        assert_eq!(markups(&blocks.units), vec!["<header>h</header>", "<p>a</p>"]);
        assert_eq!(
            blocks.page(["<p>a</p>"]),
            "<div><p>a</p></div>"
        );
    }

    #[test]
    fn test_descends_nested_wrappers() {
        let html = "<div><main><p>a</p><p>b</p></main></div>";
        let blocks = split_blocks(html).unwrap();
        assert_eq!(blocks.wrappers, vec!["div".to_string(), "main".to_string()]);
        assert_eq!(blocks.page(["<p>b</p>"]), "<div><main><p>b</p></main></div>");
    }

    #[test]
    fn test_single_leaf_element_is_not_descended() {
        let blocks = split_blocks("<p>plain text</p>").unwrap();
        assert!(blocks.wrappers.is_empty());
        assert_eq!(markups(&blocks.units), vec!["<p>plain text</p>"]);
    }

    #[test]
    fn test_lone_paragraph_with_inline_children_descends() {
        let blocks = split_blocks("<p>only <strong>text</strong></p>").unwrap();
        assert_eq!(blocks.wrappers, vec!["p".to_string()]);
        assert_eq!(markups(&blocks.units), vec!["only ", "<strong>text</strong>"]);
        assert_eq!(
            blocks.page(markups(&blocks.units)),
            "<p>only <strong>text</strong></p>"
        );
    }
}
