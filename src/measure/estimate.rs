//! Text-metrics layout model used as the built-in measurement surface.

use super::cascade::{selector_classes, Cascade, Declarations, ElementRef, LineHeight};
use super::{MeasurementSurface, SurfaceSpec};
use crate::error::{Error, Result};
use crate::model::ThemeTokens;
use crate::paginate::is_void_element;
use crate::style::{rule_for, ROOT_FONT_SIZE_PX};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use unicode_normalization::UnicodeNormalization;

/// Average glyph advance of proportional text, in em.
const AVERAGE_ADVANCE_EM: f32 = 0.5;

/// Advance of full-width (CJK, Hangul, fullwidth forms) glyphs, in em.
const WIDE_ADVANCE_EM: f32 = 1.0;

/// Width of an inter-word space, in em.
const SPACE_ADVANCE_EM: f32 = 0.25;

/// User-agent start indent of lists, quotes and definitions.
const BLOCK_INDENT_PX: f32 = 40.0;

/// User-agent size of an image without dimensions.
const DEFAULT_IMAGE_PX: (f32, f32) = (300.0, 150.0);

/// Rule thickness of `<hr>` (two 1px borders).
const RULE_PX: f32 = 2.0;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Deterministic layout model that estimates rendered heights.
///
/// The model lays block elements out top to bottom with collapsed adjoining
/// margins, applies the projected typography multipliers, and wraps inline
/// text word by word using average glyph advances. The mounted stylesheet is
/// read for the declarations that move heights (`font-size`, `line-height`,
/// vertical margins, `display: none`), so author CSS shifts page breaks the
/// same way it does in the preview. It agrees with a browser closely enough
/// for preview pagination; hosts that own a real layout engine should
/// implement [`MeasurementSurface`] over it instead.
#[derive(Debug, Default)]
pub struct EstimatingSurface {
    mounted: Option<Mounted>,
}

#[derive(Debug)]
struct Mounted {
    width: f32,
    theme: ThemeTokens,
    cascade: Cascade,
    root_classes: Vec<String>,
}

impl EstimatingSurface {
    /// Create an unmounted surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content-box width of the mounted surface.
    pub fn width(&self) -> Option<f32> {
        self.mounted.as_ref().map(|m| m.width)
    }
}

impl MeasurementSurface for EstimatingSurface {
    fn mount(&mut self, spec: &SurfaceSpec) -> Result<()> {
        self.mounted = Some(Mounted {
            width: spec.width_px,
            theme: spec.theme.clone(),
            cascade: Cascade::parse(&spec.stylesheet),
            root_classes: selector_classes(&spec.selector),
        });
        Ok(())
    }

    fn measure(&mut self, html: &str) -> Result<f32> {
        let mounted = self
            .mounted
            .as_ref()
            .ok_or_else(|| Error::MeasurementUnavailable("surface is not mounted".into()))?;
        if !(mounted.width > 0.0) {
            return Err(Error::MeasurementUnavailable(format!(
                "surface width is {}px",
                mounted.width
            )));
        }

        let root = TreeBuilder::new(mounted).build(html)?;
        Ok(root.content_height(mounted.width))
    }

    fn unmount(&mut self) {
        self.mounted = None;
    }

    fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }
}

/// A block box and its in-flow content.
#[derive(Debug, Clone, Default)]
struct BlockBox {
    margin_top: f32,
    margin_bottom: f32,
    indent: f32,
    row: bool,
    fixed_height: Option<f32>,
    children: Vec<Flow>,
}

#[derive(Debug, Clone)]
enum Flow {
    Block(BlockBox),
    Inline(Vec<Piece>),
}

#[derive(Debug, Clone, Copy)]
enum Piece {
    /// A word or replaced element sitting on a line.
    Run {
        width: f32,
        height: f32,
        space: f32,
        breakable: bool,
    },
    /// A forced line break.
    Break { height: f32 },
}

impl BlockBox {
    fn push_piece(&mut self, piece: Piece) {
        if let Some(Flow::Inline(pieces)) = self.children.last_mut() {
            pieces.push(piece);
        } else {
            self.children.push(Flow::Inline(vec![piece]));
        }
    }

    /// Height of the content box, excluding this box's own margins.
    fn content_height(&self, width: f32) -> f32 {
        if let Some(height) = self.fixed_height {
            return height;
        }
        let inner = (width - self.indent).max(1.0);
        if self.row {
            let cells: Vec<&BlockBox> = self
                .children
                .iter()
                .filter_map(|child| match child {
                    Flow::Block(cell) => Some(cell),
                    Flow::Inline(_) => None,
                })
                .collect();
            if !cells.is_empty() {
                let cell_width = inner / cells.len() as f32;
                return cells
                    .iter()
                    .map(|cell| {
                        cell.margin_top + cell.content_height(cell_width) + cell.margin_bottom
                    })
                    .fold(0.0, f32::max);
            }
        }

        let mut total = 0.0;
        let mut pending_margin: Option<f32> = None;
        for child in &self.children {
            match child {
                Flow::Block(block) => {
                    let top = match pending_margin.take() {
                        Some(bottom) => bottom.max(block.margin_top),
                        None => block.margin_top,
                    };
                    total += top + block.content_height(inner);
                    pending_margin = Some(block.margin_bottom);
                }
                Flow::Inline(pieces) => {
                    total += pending_margin.take().unwrap_or(0.0);
                    total += inline_height(pieces, inner);
                }
            }
        }
        total + pending_margin.unwrap_or(0.0)
    }
}

/// Height of a run of inline content wrapped to `max_width`.
fn inline_height(pieces: &[Piece], max_width: f32) -> f32 {
    let mut total = 0.0;
    let mut line_width = 0.0;
    let mut line_height: f32 = 0.0;

    for piece in pieces {
        match *piece {
            Piece::Break { height } => {
                total += if line_height > 0.0 { line_height } else { height };
                line_width = 0.0;
                line_height = 0.0;
            }
            Piece::Run {
                width,
                height,
                space,
                breakable,
            } => {
                let mut gap = if line_width > 0.0 { space } else { 0.0 };
                if line_width > 0.0 && line_width + gap + width > max_width {
                    total += line_height;
                    line_width = 0.0;
                    line_height = 0.0;
                    gap = 0.0;
                }
                if breakable && width > max_width {
                    let extra_lines = (width / max_width).ceil() - 1.0;
                    total += extra_lines * height;
                    line_width = width - extra_lines * max_width;
                } else {
                    line_width += gap + width;
                }
                line_height = line_height.max(height);
            }
        }
    }

    total + line_height
}

struct Open {
    tag: String,
    classes: Vec<String>,
    font_px: f32,
    line_height: LineHeight,
    kind: OpenKind,
}

enum OpenKind {
    Block(BlockBox),
    Inline,
    /// Inside a `display: none` subtree
    Hidden,
}

struct TreeBuilder<'m> {
    theme: &'m ThemeTokens,
    cascade: &'m Cascade,
    root_classes: &'m [String],
    root: BlockBox,
    root_font_px: f32,
    root_line_height: LineHeight,
    stack: Vec<Open>,
    pending_space: bool,
    pre_depth: usize,
    hidden_depth: usize,
}

impl<'m> TreeBuilder<'m> {
    fn new(mounted: &'m Mounted) -> Self {
        let theme = &mounted.theme;
        let root = ElementRef {
            tag: "div",
            classes: &mounted.root_classes,
        };
        let declared = mounted.cascade.declarations(&root, &[]);
        let root_font_px = declared
            .font_size
            .map_or(theme.font_size, |size| size.to_px(ROOT_FONT_SIZE_PX));
        let root_line_height = declared
            .line_height
            .unwrap_or(LineHeight::Factor(theme.line_height))
            .computed(root_font_px);

        Self {
            theme,
            cascade: &mounted.cascade,
            root_classes: &mounted.root_classes,
            root: BlockBox::default(),
            root_font_px,
            root_line_height,
            stack: Vec::new(),
            pending_space: false,
            pre_depth: 0,
            hidden_depth: 0,
        }
    }

    fn build(mut self, html: &str) -> Result<BlockBox> {
        let mut reader = Reader::from_str(html);
        {
            let config = reader.config_mut();
            config.trim_text(false);
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
            config.check_comments = false;
            config.allow_dangling_amp = true;
        }

        loop {
            match reader.read_event()? {
                Event::Start(e) => self.open(&e, false),
                Event::Empty(e) => self.open(&e, true),
                Event::End(e) => self.close(&tag_name(e.name().as_ref())),
                Event::Text(e) => self.text(&String::from_utf8_lossy(&e)),
                Event::CData(e) => self.text(&String::from_utf8_lossy(&e)),
                Event::GeneralRef(_) => self.entity(),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        while !self.stack.is_empty() {
            self.pop();
        }
        Ok(self.root)
    }

    fn font_px(&self) -> f32 {
        self.stack
            .last()
            .map_or(self.root_font_px, |open| open.font_px)
    }

    fn line_height(&self) -> LineHeight {
        self.stack
            .last()
            .map_or(self.root_line_height, |open| open.line_height)
    }

    /// Height of a line box holding inline content at the current position:
    /// the inline's own line height, never less than its block's strut.
    fn line_px(&self) -> f32 {
        let strut = self
            .stack
            .iter()
            .rev()
            .find(|open| matches!(open.kind, OpenKind::Block(_)))
            .map_or(self.root_line_height.to_px(self.root_font_px), |open| {
                open.line_height.to_px(open.font_px)
            });
        self.line_height().to_px(self.font_px()).max(strut)
    }

    fn current_block(&mut self) -> &mut BlockBox {
        let index = self
            .stack
            .iter()
            .rposition(|open| matches!(open.kind, OpenKind::Block(_)));
        match index.map(|i| &mut self.stack[i].kind) {
            Some(OpenKind::Block(block)) => block,
            _ => &mut self.root,
        }
    }

    fn declarations(&self, tag: &str, classes: &[String]) -> Declarations {
        let mut ancestors = Vec::with_capacity(self.stack.len() + 1);
        ancestors.push(ElementRef {
            tag: "div",
            classes: self.root_classes,
        });
        ancestors.extend(self.stack.iter().map(|open| ElementRef {
            tag: &open.tag,
            classes: &open.classes,
        }));
        self.cascade
            .declarations(&ElementRef { tag, classes }, &ancestors)
    }

    fn push_hidden(&mut self, tag: String) {
        self.stack.push(Open {
            tag,
            classes: Vec::new(),
            font_px: self.font_px(),
            line_height: self.line_height(),
            kind: OpenKind::Hidden,
        });
        self.hidden_depth += 1;
    }

    fn open(&mut self, e: &BytesStart<'_>, self_closing: bool) {
        let tag = tag_name(e.name().as_ref());
        let void = self_closing || is_void_element(&tag);
        if self.hidden_depth > 0 {
            if !void {
                self.push_hidden(tag);
            }
            return;
        }
        if tag == "br" {
            let height = self.line_px();
            self.current_block().push_piece(Piece::Break { height });
            self.pending_space = false;
            return;
        }

        let classes = class_list(e);
        let declared = self.declarations(&tag, &classes);
        if declared.hidden == Some(true) {
            if !void {
                self.push_hidden(tag);
            }
            return;
        }

        if tag == "img" {
            self.image(e);
        } else if BLOCK_ELEMENTS.contains(&tag.as_str()) {
            self.pending_space = false;
            let (block, font_px, line_height) = self.block_for(&tag, &declared);
            if void {
                self.current_block().children.push(Flow::Block(block));
            } else {
                if tag == "pre" {
                    self.pre_depth += 1;
                }
                self.stack.push(Open {
                    tag,
                    classes,
                    font_px,
                    line_height,
                    kind: OpenKind::Block(block),
                });
            }
        } else if !void {
            let parent_px = self.font_px();
            let font_px = declared
                .font_size
                .map_or(parent_px * inline_font_scale(&tag), |size| size.to_px(parent_px));
            let line_height = declared
                .line_height
                .map_or_else(|| self.line_height(), |lh| lh.computed(font_px));
            self.stack.push(Open {
                tag,
                classes,
                font_px,
                line_height,
                kind: OpenKind::Inline,
            });
        }
    }

    fn close(&mut self, tag: &str) {
        let Some(index) = self.stack.iter().rposition(|open| open.tag == tag) else {
            return;
        };
        while self.stack.len() > index {
            self.pop();
        }
    }

    fn pop(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        match open.kind {
            OpenKind::Block(block) => {
                if open.tag == "pre" {
                    self.pre_depth = self.pre_depth.saturating_sub(1);
                }
                self.pending_space = false;
                self.current_block().children.push(Flow::Block(block));
            }
            OpenKind::Hidden => self.hidden_depth = self.hidden_depth.saturating_sub(1),
            OpenKind::Inline => {}
        }
    }

    /// Box, font size and line height of a block element.
    fn block_for(&self, tag: &str, declared: &Declarations) -> (BlockBox, f32, LineHeight) {
        let parent_px = self.font_px();
        let spacing_px = self.theme.paragraph_spacing * ROOT_FONT_SIZE_PX;
        let (base_px, ruled_top, ruled_bottom) = match rule_for(tag) {
            Some(rule) => (
                self.theme.font_size * rule.font_scale,
                rule.margin_top.map(|m| m * spacing_px),
                rule.margin_bottom.map(|m| m * spacing_px),
            ),
            None => (parent_px * ua_font_scale(tag), None, None),
        };
        let font_px = declared
            .font_size
            .map_or(base_px, |size| size.to_px(parent_px));
        let line_height = declared
            .line_height
            .map_or_else(|| self.line_height(), |lh| lh.computed(font_px));
        let (ua_top, ua_bottom) = ua_margins_em(tag);

        let block = BlockBox {
            margin_top: declared
                .margin_top
                .map(|m| m.to_px(font_px))
                .or(ruled_top)
                .unwrap_or(ua_top * font_px),
            margin_bottom: declared
                .margin_bottom
                .map(|m| m.to_px(font_px))
                .or(ruled_bottom)
                .unwrap_or(ua_bottom * font_px),
            indent: match tag {
                "ul" | "ol" | "blockquote" | "dd" => BLOCK_INDENT_PX,
                _ => 0.0,
            },
            row: tag == "tr",
            fixed_height: (tag == "hr").then_some(RULE_PX),
            children: Vec::new(),
        };
        (block, font_px, line_height)
    }

    fn text(&mut self, text: &str) {
        if self.hidden_depth > 0 {
            return;
        }
        let font_px = self.font_px();
        let height = self.line_px();

        if self.pre_depth > 0 {
            for (i, segment) in text.split('\n').enumerate() {
                if i > 0 {
                    self.current_block().push_piece(Piece::Break { height });
                }
                if !segment.is_empty() {
                    self.current_block().push_piece(Piece::Run {
                        width: advance(segment, font_px),
                        height,
                        space: 0.0,
                        breakable: false,
                    });
                }
            }
            return;
        }

        let mut space_before = self.pending_space || text.starts_with(char::is_whitespace);
        let mut any_word = false;
        for word in text.split_whitespace() {
            let space = if space_before {
                SPACE_ADVANCE_EM * font_px
            } else {
                0.0
            };
            self.current_block().push_piece(Piece::Run {
                width: advance(word, font_px),
                height,
                space,
                breakable: true,
            });
            space_before = true;
            any_word = true;
        }
        self.pending_space = if any_word {
            text.ends_with(char::is_whitespace)
        } else {
            space_before
        };
    }

    fn entity(&mut self) {
        if self.hidden_depth > 0 {
            return;
        }
        let font_px = self.font_px();
        let space = if self.pending_space {
            SPACE_ADVANCE_EM * font_px
        } else {
            0.0
        };
        let height = self.line_px();
        self.current_block().push_piece(Piece::Run {
            width: AVERAGE_ADVANCE_EM * font_px,
            height,
            space,
            breakable: true,
        });
        self.pending_space = false;
    }

    fn image(&mut self, e: &BytesStart<'_>) {
        let (width, height) = match (dimension(e, b"width"), dimension(e, b"height")) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * DEFAULT_IMAGE_PX.1 / DEFAULT_IMAGE_PX.0),
            (None, Some(h)) => (h * DEFAULT_IMAGE_PX.0 / DEFAULT_IMAGE_PX.1, h),
            (None, None) => DEFAULT_IMAGE_PX,
        };
        let space = if self.pending_space {
            SPACE_ADVANCE_EM * self.font_px()
        } else {
            0.0
        };
        let line_px = self.line_px();
        self.current_block().push_piece(Piece::Run {
            width,
            height: height.max(line_px),
            space,
            breakable: false,
        });
        self.pending_space = false;
    }
}

/// Horizontal advance of `text` at `font_px`.
fn advance(text: &str, font_px: f32) -> f32 {
    text.nfc()
        .map(|c| {
            if is_wide(c) {
                WIDE_ADVANCE_EM
            } else {
                AVERAGE_ADVANCE_EM
            }
        })
        .sum::<f32>()
        * font_px
}

fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}')
}

/// User-agent vertical margins (em) for elements the theme does not style.
fn ua_margins_em(tag: &str) -> (f32, f32) {
    match tag {
        "p" | "ul" | "ol" | "dl" | "blockquote" | "figure" | "pre" => (1.0, 1.0),
        "h1" => (0.67, 0.67),
        "h2" => (0.83, 0.83),
        "h3" => (1.0, 1.0),
        "h4" => (1.33, 1.33),
        "h5" => (1.67, 1.67),
        "h6" => (2.33, 2.33),
        "hr" => (0.5, 0.5),
        _ => (0.0, 0.0),
    }
}

fn ua_font_scale(tag: &str) -> f32 {
    match tag {
        "h5" => 0.83,
        "h6" => 0.67,
        _ => 1.0,
    }
}

fn inline_font_scale(tag: &str) -> f32 {
    match tag {
        "small" | "sub" | "sup" => 0.83,
        "big" => 1.2,
        _ => 1.0,
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn dimension(e: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    attribute(e, name)
        .and_then(|value| value.trim().trim_end_matches("px").parse::<f32>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
}

fn class_list(e: &BytesStart<'_>) -> Vec<String> {
    attribute(e, b"class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn tag_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    let local = name.rsplit(':').next().unwrap_or(&name);
    local.to_ascii_lowercase()
}
