//! # Style Resolution
//!
//! Turns a [`DocumentConfig`] into the concrete paragraph and table styles
//! the processors draw with. Two families live side by side:
//!
//! - **Scaled styles** (`title`, `headings`, `body`, `quote`, ...) follow the
//!   configured typography and palette.
//! - **Fixed styles** (`normal`, `heading1`..`heading3`, `doc_title`) keep
//!   constant sizes for structural text such as section titles, TOC lines
//!   and form labels, so they read the same under every template.

use crate::color::Color;
use crate::config::{ColorPalette, DocumentConfig, HAlign, Template, Typography};
use crate::text::{Font, Span};

/// A box drawn around a paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub background: Option<Color>,
    pub border: Option<(Color, f32)>,
    pub padding: f32,
}

/// Character and paragraph attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
    pub color: Color,
    pub align: HAlign,
    pub left_indent: f32,
    pub right_indent: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub frame: Option<BoxStyle>,
}

impl TextStyle {
    pub fn new(font: Font, size: f32) -> Self {
        Self {
            font,
            size,
            leading: size * 1.2,
            color: Color::BLACK,
            align: HAlign::Left,
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
            frame: None,
        }
    }

    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn indent(mut self, left: f32, right: f32) -> Self {
        self.left_indent = left;
        self.right_indent = right;
        self
    }

    pub fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    pub fn framed(mut self, background: Option<Color>, border: Option<(Color, f32)>, padding: f32) -> Self {
        self.frame = Some(BoxStyle {
            background,
            border,
            padding,
        });
        self
    }

    pub fn bold(mut self) -> Self {
        self.font = self.font.bold();
        self
    }

    pub fn italic(mut self) -> Self {
        self.font = self.font.italic();
        self
    }

    /// Span carrying this style's character attributes, with empty text.
    pub fn base_span(&self) -> Span {
        Span::new("", self.font, self.size, self.color)
    }
}

/// Colors for generated tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTheme {
    pub header_fill: Color,
    pub header_text: Color,
    pub grid: Color,
    pub accent_rule: Color,
    pub stripe: Color,
    pub outline: Color,
    pub inner: Color,
}

/// Every named style a processor may ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub title: TextStyle,
    pub subtitle: TextStyle,
    /// Scaled headings, level 1 at index 0.
    pub headings: [TextStyle; 6],
    pub body: TextStyle,
    pub quote: TextStyle,
    pub highlight: TextStyle,
    pub code_block: TextStyle,
    pub caption: TextStyle,
    pub sidebar: TextStyle,

    pub normal: TextStyle,
    pub doc_title: TextStyle,
    pub heading1: TextStyle,
    pub heading2: TextStyle,
    pub heading3: TextStyle,

    pub table: TableTheme,
    pub palette: ColorPalette,
    pub typography: Typography,
}

impl StyleSheet {
    pub fn resolve(config: &DocumentConfig) -> Self {
        let typo = &config.typography;
        let pal = config.palette();
        let bold_primary = typo.primary_font.bold();

        let title_size = typo.size(3);
        let title = TextStyle::new(bold_primary, title_size).color(pal.primary);
        let title = match config.template() {
            Template::Corporate => title
                .align(HAlign::Left)
                .spacing(0.0, 20.0)
                .framed(None, Some((pal.accent, 3.0)), 10.0),
            Template::Creative => title
                .align(HAlign::Center)
                .spacing(0.0, 40.0)
                .framed(Some(pal.secondary), None, 10.0),
            _ => title.align(HAlign::Center).spacing(0.0, 30.0),
        };

        let subtitle = TextStyle::new(typo.secondary_font, typo.size(2))
            .color(pal.secondary)
            .align(HAlign::Center)
            .spacing(10.0, 20.0);

        let headings = std::array::from_fn(|i| {
            let level = i as i32 + 1;
            let size = typo.size(7 - level);
            TextStyle::new(bold_primary, size)
                .color(pal.primary)
                .indent(i as f32 * 20.0, 0.0)
                .spacing(size * 0.8, size * 0.4)
        });

        let base = TextStyle::new(typo.primary_font, typo.base_size).color(pal.text);

        let body = base
            .clone()
            .leading(typo.leading())
            .align(HAlign::Justify)
            .spacing(0.0, typo.paragraph_spacing);

        let quote_size = typo.base_size + 2.0;
        let quote = TextStyle::new(typo.primary_font, quote_size)
            .color(pal.muted)
            .indent(30.0, 30.0)
            .spacing(6.0, 6.0)
            .framed(Some(pal.background), Some((pal.accent, 1.0)), 15.0);

        let highlight = base
            .clone()
            .spacing(6.0, 6.0)
            .framed(Some(pal.warning), Some((pal.accent, 1.0)), 8.0);

        let code_block = TextStyle::new(typo.monospace_font, typo.base_size - 1.0)
            .color(pal.text)
            .indent(20.0, 20.0)
            .spacing(6.0, 6.0)
            .framed(Some(Color::from_u32(0xF5F5F5)), Some((pal.muted, 1.0)), 10.0);

        let caption = TextStyle::new(typo.primary_font, typo.base_size - 2.0)
            .color(pal.muted)
            .align(HAlign::Center)
            .spacing(0.0, 6.0);

        let sidebar = base
            .clone()
            .indent(10.0, 10.0)
            .framed(Some(pal.secondary), Some((pal.primary, 3.0)), 15.0);

        let normal = TextStyle::new(Font::Helvetica, 10.0).leading(12.0);
        let doc_title = TextStyle::new(Font::HelveticaBold, 18.0)
            .leading(22.0)
            .align(HAlign::Center)
            .spacing(0.0, 6.0);
        let heading1 = TextStyle::new(Font::HelveticaBold, 18.0).leading(22.0).spacing(12.0, 6.0);
        let heading2 = TextStyle::new(Font::HelveticaBold, 14.0).leading(17.0).spacing(12.0, 6.0);
        let heading3 = TextStyle::new(Font::HelveticaBold, 12.0).leading(14.0).spacing(12.0, 6.0);

        let table = TableTheme {
            header_fill: pal.primary,
            header_text: Color::WHITE,
            grid: pal.muted,
            accent_rule: pal.primary,
            stripe: pal.background,
            outline: pal.primary,
            inner: pal.secondary,
        };

        StyleSheet {
            title,
            subtitle,
            headings,
            body,
            quote,
            highlight,
            code_block,
            caption,
            sidebar,
            normal,
            doc_title,
            heading1,
            heading2,
            heading3,
            table,
            palette: pal.clone(),
            typography: typo.clone(),
        }
    }

    /// Scaled heading for `level` (clamped to 1..=6).
    pub fn heading(&self, level: u8) -> &TextStyle {
        &self.headings[(level.clamp(1, 6) - 1) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorScheme;

    #[test]
    fn test_heading_sizes_follow_scale() {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::resolve(&config);
        for level in 1..=6u8 {
            let h = sheet.heading(level);
            assert_eq!(h.size, config.typography.size(7 - level as i32));
            assert_eq!(h.color, config.palette().primary);
            assert_eq!(h.left_indent, (level - 1) as f32 * 20.0);
        }
        assert!(sheet.heading(1).size > sheet.heading(6).size);
    }

    #[test]
    fn test_body_style() {
        let config = DocumentConfig::new(Template::Minimal, ColorScheme::Modern);
        let sheet = StyleSheet::resolve(&config);
        assert_eq!(sheet.body.align, HAlign::Justify);
        assert_eq!(sheet.body.leading, 18.0);
        assert_eq!(sheet.body.color.to_hex(), "#333333");
    }

    #[test]
    fn test_title_treatment_varies_but_size_does_not() {
        let minimal = StyleSheet::resolve(&DocumentConfig::new(Template::Minimal, ColorScheme::Classic));
        let corporate = StyleSheet::resolve(&DocumentConfig::new(Template::Corporate, ColorScheme::Classic));
        let creative = StyleSheet::resolve(&DocumentConfig::new(Template::Creative, ColorScheme::Classic));

        assert_eq!(minimal.title.size, corporate.title.size);
        assert_eq!(minimal.title.size, creative.title.size);

        assert_eq!(minimal.title.align, HAlign::Center);
        assert!(minimal.title.frame.is_none());
        assert_eq!(corporate.title.align, HAlign::Left);
        assert!(corporate.title.frame.and_then(|f| f.border).is_some());
        assert!(creative.title.frame.and_then(|f| f.background).is_some());
    }

    #[test]
    fn test_heading_level_clamped() {
        let sheet = StyleSheet::resolve(&DocumentConfig::default());
        assert_eq!(sheet.heading(0), sheet.heading(1));
        assert_eq!(sheet.heading(9), sheet.heading(6));
    }
}
