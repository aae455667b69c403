//! Greedy line breaking over estimated glyph widths.

use quire_render_core::{Citation, ImageData, PageItem, PlacedImage, TextRun};
use quire_types::{Color, IdName, Rect, ResourceUri};

/// Average advance of a glyph, as a fraction of the font size.
const CHAR_WIDTH_EM: f32 = 0.5;
const SPACE_WIDTH_EM: f32 = 0.25;
const ASCENT_EM: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: Color::BLACK,
        }
    }
}

impl TextStyle {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * CHAR_WIDTH_EM
    }
}

#[derive(Debug, Clone)]
pub enum Token {
    Word { text: String, style: TextStyle },
    Space(f32),
    Citation { ref_id: IdName, style: TextStyle },
    Image {
        source: ResourceUri,
        data: ImageData,
        width: f32,
        height: f32,
    },
    /// Marks where an identifier-defining node starts.
    Anchor(IdName),
    /// Marks where a footnote is cited; the index refers to its body lines.
    Footnote(usize),
    /// Ends the current line.
    Break,
}

impl Token {
    fn is_visible(&self) -> bool {
        matches!(
            self,
            Token::Word { .. } | Token::Citation { .. } | Token::Image { .. }
        )
    }

    fn width(&self, fallback: &str) -> f32 {
        match self {
            Token::Word { text, style } => style.text_width(text),
            Token::Citation { style, .. } => style.text_width(fallback),
            Token::Image { width, .. } => *width,
            Token::Space(w) => *w,
            _ => 0.0,
        }
    }

    /// (height, ascent) this token needs in a line.
    fn extent(&self, line_height: f32) -> (f32, f32) {
        match self {
            Token::Word { style, .. } | Token::Citation { style, .. } => {
                let half_leading = style.size * (line_height - 1.0) / 2.0;
                (style.size * line_height, half_leading + style.size * ASCENT_EM)
            }
            Token::Image { height, .. } => (*height, *height),
            _ => (0.0, 0.0),
        }
    }
}

/// Splits `text` into words and collapsed spaces.
pub fn push_text(tokens: &mut Vec<Token>, text: &str, style: TextStyle) {
    let space = Token::Space(style.size * SPACE_WIDTH_EM);
    if text.starts_with(char::is_whitespace) {
        tokens.push(space.clone());
    }
    let mut words = text.split_whitespace().peekable();
    while let Some(word) = words.next() {
        tokens.push(Token::Word {
            text: word.to_string(),
            style,
        });
        if words.peek().is_some() {
            tokens.push(space.clone());
        }
    }
    if text.ends_with(char::is_whitespace) && !text.trim().is_empty() {
        tokens.push(space);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

impl Align {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "center" => Align::Center,
            "end" | "right" => Align::End,
            _ => Align::Start,
        }
    }
}

/// A horizontal band lines are set in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Paragraph {
    pub area: Area,
    pub indent: f32,
    pub align: Align,
    pub line_height: f32,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub ascent: f32,
    pub items: Vec<(f32, Token)>,
}

impl Line {
    fn new() -> Self {
        Self {
            x: 0.0,
            width: 0.0,
            height: 0.0,
            ascent: 0.0,
            items: Vec::new(),
        }
    }

    fn has_visible(&self) -> bool {
        self.items.iter().any(|(_, t)| t.is_visible())
    }
}

/// Breaks `tokens` into lines no wider than the paragraph area where possible.
/// A single token wider than the area gets a line of its own.
pub fn break_lines(tokens: Vec<Token>, para: &Paragraph, fallback: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::new();
    let mut indent = para.indent;
    let mut pending_space = 0.0f32;

    let finish = |mut line: Line, indent: f32| {
        let slack = (para.area.width - indent - line.width).max(0.0);
        let offset = match para.align {
            Align::Start => 0.0,
            Align::Center => slack / 2.0,
            Align::End => slack,
        };
        line.x = para.area.x + indent + offset;
        line
    };

    for token in tokens {
        match token {
            Token::Space(w) => {
                if line.has_visible() {
                    pending_space = pending_space.max(w);
                }
            }
            Token::Break => {
                lines.push(finish(std::mem::replace(&mut line, Line::new()), indent));
                indent = 0.0;
                pending_space = 0.0;
            }
            Token::Anchor(_) | Token::Footnote(_) => {
                let at = line.width;
                line.items.push((at, token));
            }
            visible => {
                let w = visible.width(fallback);
                if line.has_visible() && line.width + pending_space + w > para.area.width - indent {
                    lines.push(finish(std::mem::replace(&mut line, Line::new()), indent));
                    indent = 0.0;
                } else if line.has_visible() {
                    line.width += pending_space;
                }
                pending_space = 0.0;
                let (height, ascent) = visible.extent(para.line_height);
                line.height = line.height.max(height);
                line.ascent = line.ascent.max(ascent);
                let at = line.width;
                line.width += w;
                line.items.push((at, visible));
            }
        }
    }
    if !line.items.is_empty() {
        lines.push(finish(line, indent));
    }
    lines
}

/// What placing a line produced besides page items.
#[derive(Debug, Default)]
pub struct Placed {
    pub anchors: Vec<IdName>,
    pub footnotes: Vec<usize>,
}

/// Turns `line`, with its top edge at `top`, into page items. Adjacent words
/// of one style become a single text run.
pub fn emit_line(line: &Line, top: f32, items: &mut Vec<PageItem>, fallback: &str) -> Placed {
    let baseline = top + line.ascent;
    let mut placed = Placed::default();
    let mut run: Option<(TextRun, f32)> = None;

    let flush = |run: &mut Option<(TextRun, f32)>, items: &mut Vec<PageItem>| {
        if let Some((text, _)) = run.take() {
            items.push(PageItem::Text(text));
        }
    };

    for (offset, token) in &line.items {
        let x = line.x + offset;
        match token {
            Token::Word { text, style } => {
                if let Some((current, end)) = run.as_mut()
                    && current.font_size == style.size
                    && current.color == style.color
                {
                    if x - *end > 0.01 {
                        current.text.push(' ');
                    }
                    current.text.push_str(text);
                    *end = x + style.text_width(text);
                    continue;
                }
                flush(&mut run, items);
                run = Some((
                    TextRun {
                        x,
                        y: baseline,
                        font_size: style.size,
                        color: style.color,
                        text: text.clone(),
                    },
                    x + style.text_width(text),
                ));
            }
            Token::Citation { ref_id, style } => {
                flush(&mut run, items);
                items.push(PageItem::Citation(Citation {
                    x,
                    y: baseline,
                    font_size: style.size,
                    color: style.color,
                    ref_id: ref_id.clone(),
                    fallback: fallback.to_string(),
                    resolved: None,
                }));
            }
            Token::Image {
                source,
                data,
                width,
                height,
            } => {
                flush(&mut run, items);
                items.push(PageItem::Image(PlacedImage {
                    rect: Rect::new(x, baseline - height, *width, *height),
                    source: source.clone(),
                    data: data.clone(),
                }));
            }
            Token::Anchor(name) => placed.anchors.push(name.clone()),
            Token::Footnote(index) => placed.footnotes.push(*index),
            Token::Space(_) | Token::Break => {}
        }
    }
    flush(&mut run, items);
    placed
}
