//! Text content: headings, free text with light markup detection, styled
//! runs and lists.

use serde::{Deserialize, Serialize};

use super::{ContentMeta, Process, non_blank};
use crate::color::Color;
use crate::context::RenderContext;
use crate::element::{Element, Paragraph, Role};
use crate::error::Skip;
use crate::primitives::{HRule, InfoBox, InfoKind, ProgressBar};
use crate::style::TextStyle;
use crate::text::{Family, Font, Span};

// ============================================================================
// HEADING
// ============================================================================

fn default_level() -> u8 {
    1
}

/// A standalone heading with an optional paragraph under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: String,
}

impl Heading {
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            content: String::new(),
        }
    }

    fn size(level: u8) -> f32 {
        match level {
            0 | 1 => 16.0,
            2 => 14.0,
            3 => 12.0,
            4 => 11.0,
            _ => 10.0,
        }
    }

    pub fn style(level: u8) -> TextStyle {
        let size = Self::size(level);
        let before = if level <= 1 { 20.0 } else { 15.0 };
        TextStyle::new(Font::HelveticaBold, size)
            .leading(size * 1.2)
            .spacing(before, 10.0)
    }
}

impl ContentMeta for Heading {
    fn label() -> &'static str {
        "Heading"
    }
}

impl Process for Heading {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let text = non_blank(&self.text).ok_or_else(|| Skip::new("heading has no text"))?;
        let level = self.level.clamp(1, 6);
        let mut out = vec![
            Paragraph::new(text, &Self::style(level))
                .role(Role::Heading(level))
                .into(),
        ];
        if let Some(content) = non_blank(&self.content) {
            let body = TextStyle::new(Font::Helvetica, 11.0).leading(14.0).spacing(5.0, 15.0);
            out.push(Paragraph::new(content, &body).into());
        }
        Ok(out)
    }
}

// ============================================================================
// SMART TEXT
// ============================================================================

/// Free text. Lines are scanned for structure before anything is laid out:
///
/// ```text
/// # Title / ## Sub        → scaled headings
/// Setext title            → Heading 2 when the next line is ===, ~~~ or ^^^
/// ALL CAPS LINE           → Heading 2
/// lines between ``` fences → code block
/// > quoted                → quote
/// [INFO] ... [TIP] ...    → info boxes
/// [PROGRESS:75] label     → label above a progress bar
/// --- *** ___             → horizontal rule
/// (blank)                 → 6pt gap
/// ```
///
/// Everything else becomes body paragraphs with inline markup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default, alias = "content")]
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContentMeta for Text {
    fn label() -> &'static str {
        "Text"
    }
}

impl Process for Text {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.text.trim().is_empty() {
            return Err(Skip::new("text is empty"));
        }
        Ok(parse_text(&self.text, ctx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Body,
    Code,
    Quote,
}

struct TextScanner<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    out: Vec<Element>,
    lines: Vec<String>,
    kind: BlockKind,
}

impl<'c, 'a> TextScanner<'c, 'a> {
    fn flush(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let text = self.lines.join("\n");
        self.lines.clear();
        let sheet = self.ctx.sheet;
        let para = match self.kind {
            BlockKind::Code => Paragraph::plain(&text, &sheet.code_block),
            BlockKind::Quote => Paragraph::new(&text, &sheet.quote),
            BlockKind::Body => Paragraph::new(&text, &sheet.body),
        };
        self.out.push(para.into());
    }

    fn heading(&mut self, level: u8, text: &str) {
        let text = format!("{}{}", self.ctx.heading_prefix(), text);
        let style = self.ctx.sheet.heading(level);
        self.out
            .push(Paragraph::new(&text, style).role(Role::Heading(level)).into());
    }

    fn line(&mut self, raw: &str) {
        let line = raw.trim();

        if self.kind == BlockKind::Code {
            if line.starts_with("```") {
                self.flush();
                self.kind = BlockKind::Body;
            } else {
                self.lines.push(raw.trim_end().to_string());
            }
            return;
        }

        if line.is_empty() {
            self.flush();
            self.out.push(Element::Spacer(6.0));
            return;
        }

        if line.starts_with("```") {
            self.flush();
            self.kind = BlockKind::Code;
            return;
        }

        if let Some(quoted) = line.strip_prefix('>') {
            if self.kind != BlockKind::Quote {
                self.flush();
                self.kind = BlockKind::Quote;
            }
            self.lines.push(quoted.trim().to_string());
            return;
        }
        if self.kind == BlockKind::Quote {
            self.flush();
            self.kind = BlockKind::Body;
        }

        if let Some((level, title)) = atx_heading(line) {
            self.flush();
            self.heading(level, title);
            return;
        }
        if is_setext_underline(line) {
            match self.lines.pop() {
                Some(title) => {
                    self.flush();
                    self.heading(2, title.trim());
                }
                None => log::debug!("underline with nothing above it: {}", line),
            }
            return;
        }
        if is_caps_heading(line) {
            self.flush();
            self.heading(2, line);
            return;
        }

        if let Some(block) = special_block(line, self.ctx) {
            self.flush();
            self.out.push(block);
            return;
        }

        self.lines.push(raw.to_string());
    }
}

/// Split free text into headings, blocks and paragraphs.
pub(crate) fn parse_text(text: &str, ctx: &RenderContext) -> Vec<Element> {
    let mut scanner = TextScanner {
        ctx,
        out: Vec::new(),
        lines: Vec::new(),
        kind: BlockKind::Body,
    };
    for line in text.lines() {
        scanner.line(line);
    }
    scanner.flush();
    scanner.out
}

fn atx_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some((hashes as u8, title))
}

fn is_setext_underline(line: &str) -> bool {
    line.len() >= 3 && ['=', '~', '^'].iter().any(|&c| line.chars().all(|l| l == c))
}

fn is_caps_heading(line: &str) -> bool {
    line.chars().count() > 3
        && !line.starts_with('[')
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase)
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && ['-', '*', '_'].iter().any(|&c| line.chars().all(|l| l == c))
}

/// `[TAG]rest` with the tag matched case-insensitively.
fn strip_tag<'l>(line: &'l str, tag: &str) -> Option<&'l str> {
    let head = line.get(..tag.len())?;
    head.eq_ignore_ascii_case(tag).then(|| &line[tag.len()..])
}

fn special_block(line: &str, ctx: &RenderContext) -> Option<Element> {
    const BOXES: [(&str, InfoKind); 5] = [
        ("[INFO]", InfoKind::Info),
        ("[WARNING]", InfoKind::Warning),
        ("[ERROR]", InfoKind::Error),
        ("[SUCCESS]", InfoKind::Success),
        ("[TIP]", InfoKind::Tip),
    ];
    for (tag, kind) in BOXES {
        if let Some(rest) = strip_tag(line, tag) {
            return Some(Element::Primitive(InfoBox::new(rest.trim(), kind).into()));
        }
    }

    if let Some(rest) = strip_tag(line, "[PROGRESS:") {
        let (digits, label) = rest.split_once(']')?;
        let pct: u32 = digits.trim().parse().ok()?;
        let label = label.trim();
        let head = if label.is_empty() {
            Element::Spacer(0.0)
        } else {
            Paragraph::new(label, &ctx.sheet.normal).into()
        };
        let bar = ProgressBar::new(pct as f32).color(ctx.sheet.palette.primary);
        return Some(Element::KeepTogether(vec![head, Element::Primitive(bar.into())]));
    }

    if is_rule(line) {
        return Some(Element::Primitive(HRule::new(ctx.sheet.palette.muted).into()));
    }
    None
}

// ============================================================================
// FORMATTED TEXT
// ============================================================================

/// One run of directly styled text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattedItem {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Color>,
    pub link: Option<String>,
}

impl FormattedItem {
    fn span(&self, text: &str) -> Span {
        let font = Font::select(Family::Helvetica, self.bold, self.italic);
        let mut span = Span::new(text, font, 10.0, self.color.unwrap_or(Color::BLACK));
        span.underline = self.underline;
        if let Some(url) = self.link.as_deref().and_then(non_blank) {
            span.link = Some(url.to_string());
        }
        span
    }
}

/// A stack of individually styled lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattedText {
    pub items: Vec<FormattedItem>,
}

impl ContentMeta for FormattedText {
    fn label() -> &'static str {
        "Formatted Text"
    }
}

impl Process for FormattedText {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let style = ctx.sheet.normal.clone().leading(10.0).spacing(0.0, 2.0);
        let mut out = vec![Element::Spacer(10.0)];
        for item in &self.items {
            let Some(text) = non_blank(&item.text) else {
                continue;
            };
            out.push(Paragraph::from_spans(vec![item.span(text)], &style).into());
            out.push(Element::Spacer(6.0));
        }
        if out.len() == 1 {
            return Err(Skip::new("no formatted items with text"));
        }
        out.push(Element::Spacer(8.0));
        Ok(out)
    }
}

// ============================================================================
// COLORED TEXT
// ============================================================================

/// A highlighted line; `color` is a short name or `#hex`, `style` may
/// contain `bold` and/or `italic`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoredItem {
    pub text: String,
    pub color: String,
    pub style: String,
}

impl ColoredItem {
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
            style: String::new(),
        }
    }

    fn resolved_color(&self) -> Color {
        let name = self.color.trim().to_ascii_lowercase();
        match name.as_str() {
            "red" => Color::from_u32(0xFF0000),
            "blue" => Color::from_u32(0x0000FF),
            "green" => Color::from_u32(0x008000),
            "purple" => Color::from_u32(0x800080),
            "orange" => Color::from_u32(0xFFA500),
            "black" | "" => Color::BLACK,
            hex if hex.starts_with('#') => Color::from_hex(hex).unwrap_or(Color::BLACK),
            other => {
                log::debug!("unknown text color '{}', using black", other);
                Color::BLACK
            }
        }
    }
}

fn default_highlights_label() -> String {
    "Performance Highlights:".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredText {
    #[serde(default)]
    pub items: Vec<ColoredItem>,
    #[serde(default = "default_highlights_label")]
    pub label: String,
}

impl Default for ColoredText {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            label: default_highlights_label(),
        }
    }
}

impl ContentMeta for ColoredText {
    fn label() -> &'static str {
        "Colored Text"
    }
}

impl Process for ColoredText {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let normal = &ctx.sheet.normal;
        let mut lines = Vec::new();
        for item in &self.items {
            let Some(text) = non_blank(&item.text) else {
                continue;
            };
            let style = item.style.to_ascii_lowercase();
            let mut look = normal.clone().color(item.resolved_color());
            if style.contains("bold") {
                look = look.bold();
            }
            if style.contains("italic") {
                look = look.italic();
            }
            lines.push(Paragraph::new(text, &look).into());
            lines.push(Element::Spacer(8.0));
        }
        if lines.is_empty() {
            return Err(Skip::new("no colored items with text"));
        }

        let mut out = vec![Element::Spacer(20.0)];
        if let Some(label) = non_blank(&self.label) {
            out.push(Paragraph::plain(label, &normal.clone().bold()).into());
            out.push(Element::Spacer(10.0));
        }
        out.extend(lines);
        out.push(Element::Spacer(15.0));
        Ok(out)
    }
}

// ============================================================================
// LIST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    #[default]
    Bullet,
    Numbered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListContent {
    pub title: String,
    pub items: Vec<String>,
    #[serde(rename = "list_type", alias = "style")]
    pub kind: ListKind,
}

impl ListContent {
    pub fn new(kind: ListKind, items: Vec<String>) -> Self {
        Self {
            title: String::new(),
            items,
            kind,
        }
    }
}

impl ContentMeta for ListContent {
    fn label() -> &'static str {
        "List"
    }
}

impl Process for ListContent {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let items: Vec<&str> = self.items.iter().filter_map(|i| non_blank(i)).collect();
        if items.is_empty() {
            return Err(Skip::new("list has no items"));
        }

        let mut out = Vec::new();
        if let Some(title) = non_blank(&self.title) {
            out.extend(super::table::titled(title));
        }
        for (i, item) in items.iter().enumerate() {
            let line = match self.kind {
                ListKind::Bullet => format!("\u{2022} {}", item),
                ListKind::Numbered => format!("{}. {}", i + 1, item),
            };
            out.push(Paragraph::new(&line, &ctx.sheet.normal).into());
            out.push(Element::Spacer(6.0));
        }
        out.push(Element::Spacer(15.0));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorScheme, DocumentConfig, Template};
    use crate::fetch::MemoryFetcher;
    use crate::output::OutputDirs;
    use crate::primitives::Primitive;
    use crate::style::StyleSheet;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_ctx<T>(config: DocumentConfig, f: impl FnOnce(&RenderContext) -> T) -> T {
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        f(&ctx)
    }

    fn paragraphs(elements: &[Element]) -> Vec<(String, Role)> {
        elements
            .iter()
            .filter_map(|e| match e {
                Element::Paragraph(p) => Some((p.text(), p.role)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_sizes_and_content() {
        let heading: Heading =
            serde_json::from_value(json!({"level": 2, "text": "Results", "content": "All **green**."})).unwrap();
        let out = with_ctx(DocumentConfig::default(), |ctx| heading.process(ctx)).unwrap();
        assert_eq!(out.len(), 2);
        let Element::Paragraph(p) = &out[0] else { panic!("expected paragraph") };
        assert_eq!(p.style.size, 14.0);
        assert_eq!(p.style.space_before, 15.0);
        assert_eq!(p.role, Role::Heading(2));
        assert_eq!(Heading::style(1).space_before, 20.0);
        assert_eq!(Heading::style(6).size, 10.0);
    }

    #[test]
    fn test_heading_without_text_skips() {
        let out = with_ctx(DocumentConfig::default(), |ctx| Heading::new(1, " ").process(ctx));
        assert!(out.is_err());
    }

    #[test]
    fn test_smart_text_structure() {
        let text = "# Overview\nFirst line\nsecond line\n\nSUMMARY OF FINDINGS\n> quoted\n> more\nplain\n---\n[WARNING] careful\n[PROGRESS:40] Migration\n```\nlet x = 1;\n\nlet y = 2;\n```";
        let out = with_ctx(DocumentConfig::default(), |ctx| parse_text(text, ctx));
        let kinds: Vec<&str> = out.iter().map(Element::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "paragraph",
                "paragraph",
                "spacer",
                "paragraph",
                "paragraph",
                "paragraph",
                "primitive",
                "primitive",
                "keep_together",
                "paragraph",
            ]
        );
        let paras = paragraphs(&out);
        assert_eq!(paras[0], ("Overview".to_string(), Role::Heading(1)));
        assert_eq!(paras[1].0, "First line second line");
        assert_eq!(paras[2], ("SUMMARY OF FINDINGS".to_string(), Role::Heading(2)));
        assert_eq!(paras[3].0, "quoted more");
        assert_eq!(paras[5].0, "let x = 1;\n\nlet y = 2;");
        assert!(matches!(&out[7], Element::Primitive(Primitive::InfoBox(b)) if b.kind == InfoKind::Warning));
    }

    #[test]
    fn test_setext_heading_promotes_previous_line() {
        let out = with_ctx(DocumentConfig::default(), |ctx| parse_text("Intro\nBackground\n=====\nbody", ctx));
        let paras = paragraphs(&out);
        assert_eq!(paras[0].0, "Intro");
        assert_eq!(paras[1], ("Background".to_string(), Role::Heading(2)));
        assert_eq!(paras[2].0, "body");
    }

    #[test]
    fn test_smart_text_numbers_headings() {
        let academic = DocumentConfig::new(Template::Academic, ColorScheme::Classic);
        let out = with_ctx(academic, |ctx| parse_text("## One\ntext\n## Two", ctx));
        let paras = paragraphs(&out);
        assert_eq!(paras[0].0, "1. One");
        assert_eq!(paras[2].0, "2. Two");
    }

    #[test]
    fn test_bracket_lines_are_not_caps_headings() {
        assert!(!is_caps_heading("[NOTE] X"));
        assert!(!is_caps_heading("ABC"));
        assert!(!is_caps_heading("1234 5678"));
        assert!(is_caps_heading("Q3 RESULTS"));
        assert_eq!(atx_heading("#hashtag"), None);
        assert_eq!(atx_heading("### Deep"), Some((3, "Deep")));
    }

    #[test]
    fn test_formatted_text_spans() {
        let content: FormattedText = serde_json::from_value(json!({"items": [
            {"text": "Visit", "bold": true, "link": "https://example.com", "color": "#336699"},
            {"text": "   "},
            {"text": "quiet", "italic": true, "underline": true},
        ]}))
        .unwrap();
        let out = with_ctx(DocumentConfig::default(), |ctx| content.process(ctx)).unwrap();
        assert_eq!(out.len(), 6);
        let Element::Paragraph(first) = &out[1] else { panic!("expected paragraph") };
        assert_eq!(first.spans[0].font, Font::HelveticaBold);
        assert_eq!(first.spans[0].link.as_deref(), Some("https://example.com"));
        assert_eq!(first.spans[0].color, Color::from_u32(0x336699));
        assert_eq!(first.style.leading, 10.0);
        let Element::Paragraph(second) = &out[3] else { panic!("expected paragraph") };
        assert_eq!(second.spans[0].font, Font::HelveticaOblique);
        assert!(second.spans[0].underline);
    }

    #[test]
    fn test_colored_text_palette() {
        let mut bold = ColoredItem::new("Revenue up", "green");
        bold.style = "bold italic".into();
        let content = ColoredText {
            items: vec![bold, ColoredItem::new("Costs", "#123456"), ColoredItem::new("Other", "teal")],
            ..Default::default()
        };
        let out = with_ctx(DocumentConfig::default(), |ctx| content.process(ctx)).unwrap();
        let paras: Vec<&Paragraph> = out
            .iter()
            .filter_map(|e| match e {
                Element::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(paras[0].text(), "Performance Highlights:");
        assert_eq!(paras[1].style.color, Color::from_u32(0x008000));
        assert_eq!(paras[1].style.font, Font::HelveticaBoldOblique);
        assert_eq!(paras[2].style.color, Color::from_u32(0x123456));
        assert_eq!(paras[3].style.color, Color::BLACK);
        assert_eq!(out.last(), Some(&Element::Spacer(15.0)));
    }

    #[test]
    fn test_numbered_list_skips_blank_items() {
        let list: ListContent = serde_json::from_value(json!({
            "title": "Steps", "list_type": "numbered", "items": ["Plan", "", "Ship"]
        }))
        .unwrap();
        let out = with_ctx(DocumentConfig::default(), |ctx| list.process(ctx)).unwrap();
        let texts: Vec<String> = paragraphs(&out).into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["Steps", "1. Plan", "2. Ship"]);
    }

    #[test]
    fn test_bullet_list_and_empty_list() {
        let list = ListContent::new(ListKind::Bullet, vec!["one".into()]);
        let out = with_ctx(DocumentConfig::default(), |ctx| list.process(ctx)).unwrap();
        assert_eq!(paragraphs(&out)[0].0, "\u{2022} one");
        let empty = ListContent::new(ListKind::Bullet, vec![" ".into()]);
        assert!(with_ctx(DocumentConfig::default(), |ctx| empty.process(ctx)).is_err());
    }
}
