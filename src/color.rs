//! RGB colors with hex/name parsing and HSV conversion.
//!
//! Colors appear everywhere in document configuration, so they deserialize
//! straight from strings: `"#2E86AB"`, `"#fa0"`, or a CSS-style name such as
//! `"darkblue"`. Components are stored as `f32` in `0.0..=1.0`, which is what
//! the PDF `rg`/`RG` operators take.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::QuireError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

// ============================================================================
// NAMED COLORS
// ============================================================================

const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x008000),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("orange", 0xFFA500),
    ("purple", 0x800080),
    ("brown", 0xA52A2A),
    ("pink", 0xFFC0CB),
    ("grey", 0x808080),
    ("gray", 0x808080),
    ("olive", 0x808000),
    ("cyan", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("gold", 0xFFD700),
    ("navy", 0x000080),
    ("teal", 0x008080),
    ("maroon", 0x800000),
    ("silver", 0xC0C0C0),
    ("darkblue", 0x00008B),
    ("lightblue", 0xADD8E6),
    ("darkgreen", 0x006400),
    ("lightgreen", 0x90EE90),
    ("darkred", 0x8B0000),
    ("darkgray", 0xA9A9A9),
    ("darkgrey", 0xA9A9A9),
    ("lightgray", 0xD3D3D3),
    ("lightgrey", 0xD3D3D3),
    ("lightyellow", 0xFFFFE0),
    ("whitesmoke", 0xF5F5F5),
    ("darkorange", 0xFF8C00),
    ("skyblue", 0x87CEEB),
    ("steelblue", 0x4682B4),
    ("indigo", 0x4B0082),
    ("violet", 0xEE82EE),
    ("crimson", 0xDC143C),
    ("coral", 0xFF7F50),
    ("salmon", 0xFA8072),
    ("beige", 0xF5F5DC),
    ("ivory", 0xFFFFF0),
    ("lavender", 0xE6E6FA),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as f32 / 255.0,
            g: ((v >> 8) & 0xFF) as f32 / 255.0,
            b: (v & 0xFF) as f32 / 255.0,
        }
    }

    pub const fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    /// Look up a CSS-style color name (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|&(_, v)| Color::from_u32(v))
    }

    /// Parse `#RRGGBB` or `#RGB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.trim().trim_start_matches('#');
        if !h.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match h.len() {
            6 => u32::from_str_radix(h, 16).ok().map(Color::from_u32),
            3 => {
                let expanded: String = h.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16).ok().map(Color::from_u32)
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Hue, saturation, value, each in `0.0..=1.0`.
    pub fn to_hsv(&self) -> (f32, f32, f32) {
        let (r, g, b) = (self.r, self.g, self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let v = max;
        if (max - min).abs() < f32::EPSILON {
            return (0.0, 0.0, v);
        }
        let s = (max - min) / max;
        let rc = (max - r) / (max - min);
        let gc = (max - g) / (max - min);
        let bc = (max - b) / (max - min);
        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        ((h / 6.0).rem_euclid(1.0), s, v)
    }

    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        if s <= 0.0 {
            return Self::gray(v);
        }
        let h = h.rem_euclid(1.0);
        let i = (h * 6.0).floor();
        let f = h * 6.0 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match (i as i32).rem_euclid(6) {
            0 => Self::rgb(v, t, p),
            1 => Self::rgb(q, v, p),
            2 => Self::rgb(p, v, t),
            3 => Self::rgb(p, q, v),
            4 => Self::rgb(t, p, v),
            _ => Self::rgb(v, p, q),
        }
    }

    /// Linear interpolation toward `other`; `t = 0` is `self`.
    pub fn lerp(&self, other: &Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if s.starts_with('#') {
            Color::from_hex(s)
        } else {
            Color::named(s).or_else(|| Color::from_hex(s))
        };
        parsed.ok_or_else(|| QuireError::InvalidConfig(format!("unknown color '{}'", s)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_parse_hex_long_and_short() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!("#0f0".parse::<Color>().unwrap(), Color::rgb(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_parse_named_case_insensitive() {
        assert_eq!("DarkBlue".parse::<Color>().unwrap().to_hex(), "#00008B");
        assert_eq!("grey".parse::<Color>().unwrap(), "gray".parse::<Color>().unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-color".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_hsv_roundtrip_primaries() {
        for hex in ["#FF0000", "#00FF00", "#0000FF", "#2E86AB", "#808080"] {
            let c: Color = hex.parse().unwrap();
            let (h, s, v) = c.to_hsv();
            let back = Color::from_hsv(h, s, v);
            assert!(approx(c.r, back.r) && approx(c.g, back.g) && approx(c.b, back.b), "{}", hex);
        }
    }

    #[test]
    fn test_hsv_of_blue() {
        let (h, s, v) = Color::rgb(0.0, 0.0, 1.0).to_hsv();
        assert!(approx(h, 2.0 / 3.0));
        assert!(approx(s, 1.0));
        assert!(approx(v, 1.0));
    }

    #[test]
    fn test_serde_as_string() {
        let c: Color = serde_json::from_str("\"orange\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#FFA500\"");
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::WHITE;
        let b = Color::BLACK;
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert!(approx(a.lerp(&b, 0.5).r, 0.5));
    }
}
