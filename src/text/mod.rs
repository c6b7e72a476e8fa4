//! Text: font metrics, styled spans, line breaking and inline markup.

pub mod markup;
pub mod metrics;
pub mod wrap;

pub use metrics::{Family, Font, to_win_ansi};
pub use wrap::{Line, wrap_spans};

use crate::color::Color;

/// A run of text sharing one set of character attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub font: Font,
    pub size: f32,
    pub color: Color,
    pub underline: bool,
    /// Highlight fill behind the glyphs.
    pub background: Option<Color>,
    /// URI the run links to.
    pub link: Option<String>,
    /// Baseline shift in points (positive raises, used for superscripts).
    pub rise: f32,
}

impl Span {
    pub fn new(text: impl Into<String>, font: Font, size: f32, color: Color) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            color,
            underline: false,
            background: None,
            link: None,
            rise: 0.0,
        }
    }

    /// Same attributes, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn width(&self) -> f32 {
        self.font.text_width(&self.text, self.size)
    }

    pub(crate) fn same_style(&self, other: &Span) -> bool {
        self.font == other.font
            && self.size == other.size
            && self.color == other.color
            && self.underline == other.underline
            && self.background == other.background
            && self.link == other.link
            && self.rise == other.rise
    }
}
