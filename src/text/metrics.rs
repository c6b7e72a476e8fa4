//! Base-14 font metrics.
//!
//! Glyph advance widths (in 1/1000 em) for the printable ASCII range come
//! from the Adobe Core 14 AFM files. Oblique faces share the upright widths;
//! the Times bold-italic face borrows Times-Bold. Courier is monospaced at 600.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::QuireError;

/// One of the fourteen standard PDF fonts (symbol fonts excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Helvetica,
    Times,
    Courier,
}

const ALL: [Font; 12] = [
    Font::Helvetica,
    Font::HelveticaBold,
    Font::HelveticaOblique,
    Font::HelveticaBoldOblique,
    Font::TimesRoman,
    Font::TimesBold,
    Font::TimesItalic,
    Font::TimesBoldItalic,
    Font::Courier,
    Font::CourierBold,
    Font::CourierOblique,
    Font::CourierBoldOblique,
];

impl Font {
    /// PostScript name used as `/BaseFont`.
    pub fn pdf_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
            Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Font::TimesRoman => "Times-Roman",
            Font::TimesBold => "Times-Bold",
            Font::TimesItalic => "Times-Italic",
            Font::TimesBoldItalic => "Times-BoldItalic",
            Font::Courier => "Courier",
            Font::CourierBold => "Courier-Bold",
            Font::CourierOblique => "Courier-Oblique",
            Font::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Font::Helvetica | Font::HelveticaBold | Font::HelveticaOblique | Font::HelveticaBoldOblique => {
                Family::Helvetica
            }
            Font::TimesRoman | Font::TimesBold | Font::TimesItalic | Font::TimesBoldItalic => Family::Times,
            _ => Family::Courier,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            Font::HelveticaBold
                | Font::HelveticaBoldOblique
                | Font::TimesBold
                | Font::TimesBoldItalic
                | Font::CourierBold
                | Font::CourierBoldOblique
        )
    }

    pub fn is_italic(self) -> bool {
        matches!(
            self,
            Font::HelveticaOblique
                | Font::HelveticaBoldOblique
                | Font::TimesItalic
                | Font::TimesBoldItalic
                | Font::CourierOblique
                | Font::CourierBoldOblique
        )
    }

    /// Pick the face of `family` with the requested weight and slant.
    pub fn select(family: Family, bold: bool, italic: bool) -> Font {
        match (family, bold, italic) {
            (Family::Helvetica, false, false) => Font::Helvetica,
            (Family::Helvetica, true, false) => Font::HelveticaBold,
            (Family::Helvetica, false, true) => Font::HelveticaOblique,
            (Family::Helvetica, true, true) => Font::HelveticaBoldOblique,
            (Family::Times, false, false) => Font::TimesRoman,
            (Family::Times, true, false) => Font::TimesBold,
            (Family::Times, false, true) => Font::TimesItalic,
            (Family::Times, true, true) => Font::TimesBoldItalic,
            (Family::Courier, false, false) => Font::Courier,
            (Family::Courier, true, false) => Font::CourierBold,
            (Family::Courier, false, true) => Font::CourierOblique,
            (Family::Courier, true, true) => Font::CourierBoldOblique,
        }
    }

    pub fn bold(self) -> Font {
        Font::select(self.family(), true, self.is_italic())
    }

    pub fn italic(self) -> Font {
        Font::select(self.family(), self.is_bold(), true)
    }

    /// Ascender height as a fraction of the font size.
    pub fn ascent(self) -> f32 {
        match self.family() {
            Family::Helvetica => 0.718,
            Family::Times => 0.683,
            Family::Courier => 0.629,
        }
    }

    /// Descender depth (positive) as a fraction of the font size.
    pub fn descent(self) -> f32 {
        match self.family() {
            Family::Helvetica => 0.207,
            Family::Times => 0.217,
            Family::Courier => 0.157,
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        if self.family() == Family::Courier {
            return 600;
        }
        let table = match self {
            Font::Helvetica | Font::HelveticaOblique => &HELVETICA,
            Font::HelveticaBold | Font::HelveticaBoldOblique => &HELVETICA_BOLD,
            Font::TimesRoman => &TIMES_ROMAN,
            Font::TimesItalic => &TIMES_ITALIC,
            _ => &TIMES_BOLD,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            return table[(code - 32) as usize];
        }
        match c {
            '\u{2022}' => 350,
            '\u{2013}' => 500,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => 278,
            '\u{201C}' | '\u{201D}' => 444,
            '\u{2026}' => 1000,
            '\u{00A0}' => table[0],
            _ => table[('n' as u32 - 32) as usize],
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pdf_name())
    }
}

impl FromStr for Font {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL.iter()
            .copied()
            .find(|f| f.pdf_name().eq_ignore_ascii_case(wanted))
            .or_else(|| match wanted.to_ascii_lowercase().as_str() {
                "times" | "times-roman" | "times new roman" => Some(Font::TimesRoman),
                "helvetica-italic" => Some(Font::HelveticaOblique),
                "courier-italic" => Some(Font::CourierOblique),
                _ => None,
            })
            .ok_or_else(|| QuireError::InvalidConfig(format!("unknown font '{}'", s)))
    }
}

impl Serialize for Font {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.pdf_name())
    }
}

impl<'de> Deserialize<'de> for Font {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode text as WinAnsi bytes for a Type1 base font. Unmappable chars become `?`.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2030}' => 0x89,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

// ============================================================================
// WIDTH TABLES (chars 32..=126)
// ============================================================================

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];
