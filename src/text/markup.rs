use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use super::{Font, Span};
use crate::color::Color;

/// Parse inline markup into spans derived from `base`.
///
/// Supports:
/// - Emphasis: `**bold**`, `__bold__`, `*italic*`, `_italic_`
/// - Inline code: `` `code` `` (monospace on a light grey fill)
/// - Links: `[text](url)` (blue, underlined, clickable)
/// - Highlights: `==marked==` (yellow fill)
///
/// Block-level constructs are not interpreted: a line reading `1. intro` or
/// `# tag` keeps its literal prefix.
pub fn parse_inline(text: &str, base: &Span) -> Vec<Span> {
    let escaped = escape_block_markers(text);
    let mut state = InlineState::new(base);

    for event in Parser::new(&escaped) {
        match event {
            Event::Start(tag) => state.handle_start_tag(tag),
            Event::End(tag_end) => state.handle_end_tag(tag_end),
            Event::Text(text) => state.handle_text(&text),
            Event::Code(code) => state.handle_inline_code(&code),
            Event::SoftBreak => state.push(" "),
            Event::HardBreak => state.push("\n"),
            Event::Html(raw) | Event::InlineHtml(raw) => state.push(&raw),
            _ => {}
        }
    }
    state.spans
}

/// Plain-text spans with no markup interpretation.
pub fn plain(text: &str, base: &Span) -> Vec<Span> {
    vec![base.with_text(text)]
}

/// Backslash-escape leading characters that CommonMark would read as a block
/// marker (heading, list, quote, indented code).
fn escape_block_markers(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            let after_digits = trimmed[digits..].chars().next();
            let needs_escape = trimmed.starts_with('#')
                || trimmed.starts_with('>')
                || trimmed.starts_with("- ")
                || trimmed.starts_with("+ ")
                || trimmed.starts_with("* ")
                || trimmed.starts_with("---")
                || trimmed.starts_with("===")
                || (digits > 0 && matches!(after_digits, Some('.') | Some(')')));
            if needs_escape {
                if digits > 0 {
                    format!("{}\\{}", &trimmed[..digits], &trimmed[digits..])
                } else {
                    format!("\\{}", trimmed)
                }
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const LINK_COLOR: Color = Color::from_u32(0x0000FF);
const CODE_FILL: Color = Color::from_u32(0xD3D3D3);
const HIGHLIGHT_FILL: Color = Color::from_u32(0xFFFF00);

struct InlineState<'a> {
    base: &'a Span,
    spans: Vec<Span>,
    bold: usize,
    italic: usize,
    link: Option<String>,
    highlight: bool,
    paragraphs: usize,
}

impl<'a> InlineState<'a> {
    fn new(base: &'a Span) -> Self {
        Self {
            base,
            spans: Vec::new(),
            bold: 0,
            italic: 0,
            link: None,
            highlight: false,
            paragraphs: 0,
        }
    }

    fn current(&self) -> Span {
        let mut span = self.base.with_text("");
        let bold = self.bold > 0 || self.base.font.is_bold();
        let italic = self.italic > 0 || self.base.font.is_italic();
        span.font = Font::select(self.base.font.family(), bold, italic);
        if let Some(url) = &self.link {
            span.link = Some(url.clone());
            span.color = LINK_COLOR;
            span.underline = true;
        }
        if self.highlight {
            span.background = Some(HIGHLIGHT_FILL);
        }
        span
    }

    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let span = self.current().with_text(text);
        match self.spans.last_mut() {
            Some(last) if last.same_style(&span) => last.text.push_str(text),
            _ => self.spans.push(span),
        }
    }

    fn handle_start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                if self.paragraphs > 0 {
                    self.push("\n");
                }
                self.paragraphs += 1;
            }
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn handle_end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Link => self.link = None,
            _ => {}
        }
    }

    /// Text events may contain `==` highlight markers; each one toggles.
    fn handle_text(&mut self, text: &str) {
        let mut parts = text.split("==").peekable();
        while let Some(part) = parts.next() {
            self.push(part);
            if parts.peek().is_some() {
                self.highlight = !self.highlight;
            }
        }
    }

    fn handle_inline_code(&mut self, code: &str) {
        let mut span = self.current().with_text(code);
        span.font = Font::Courier;
        span.background = Some(CODE_FILL);
        self.spans.push(span);
    }
}
