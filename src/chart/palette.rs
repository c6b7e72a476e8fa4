//! Series colors generated from a base color.
//!
//! ```
//! use quire::chart::palette::{PaletteGenerator, PaletteScheme};
//! use quire::color::Color;
//!
//! let mut generator = PaletteGenerator::new(Color::from_u32(0x0000FF), PaletteScheme::Rainbow);
//! assert_eq!(generator.generate(6).len(), 6);
//! assert!(generator.generate(0).is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteScheme {
    Analogous,
    Complementary,
    Triadic,
    Rainbow,
    Gradient,
    #[default]
    Distinct,
}

impl PaletteScheme {
    pub const ALL: &'static [PaletteScheme] = &[
        PaletteScheme::Analogous,
        PaletteScheme::Complementary,
        PaletteScheme::Triadic,
        PaletteScheme::Rainbow,
        PaletteScheme::Gradient,
        PaletteScheme::Distinct,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaletteScheme::Analogous => "analogous",
            PaletteScheme::Complementary => "complementary",
            PaletteScheme::Triadic => "triadic",
            PaletteScheme::Rainbow => "rainbow",
            PaletteScheme::Gradient => "gradient",
            PaletteScheme::Distinct => "distinct",
        }
    }
}

/// Unknown names fall back to [`PaletteScheme::Distinct`].
impl FromStr for PaletteScheme {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == lower)
            .unwrap_or(PaletteScheme::Distinct))
    }
}

impl fmt::Display for PaletteScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const DISTINCT: [u32; 18] = [
    0x0000FF, 0xFF0000, 0x008000, 0xFFA500, 0x800080, 0xA52A2A, 0xFFC0CB, 0x808080, 0x808000,
    0x00FFFF, 0xFF00FF, 0xFFFF00, 0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, 0xFFEAA7, 0xDDA0DD,
];

const GOLDEN: f32 = 0.618034;

/// Generates `count` colors for a base color and scheme, remembering each
/// result for the generator's lifetime.
#[derive(Debug, Clone)]
pub struct PaletteGenerator {
    base: Color,
    scheme: PaletteScheme,
    cache: HashMap<usize, Vec<Color>>,
}

impl Default for PaletteGenerator {
    fn default() -> Self {
        Self::new(Color::from_u32(0x0000FF), PaletteScheme::Analogous)
    }
}

impl PaletteGenerator {
    pub fn new(base: Color, scheme: PaletteScheme) -> Self {
        Self {
            base,
            scheme,
            cache: HashMap::new(),
        }
    }

    pub fn scheme(&self) -> PaletteScheme {
        self.scheme
    }

    pub fn generate(&mut self, count: usize) -> Vec<Color> {
        if let Some(hit) = self.cache.get(&count) {
            return hit.clone();
        }
        let colors = self.compute(count);
        self.cache.insert(count, colors.clone());
        colors
    }

    fn compute(&self, count: usize) -> Vec<Color> {
        let (h, s, v) = self.base.to_hsv();
        let hue = |x: f32| x.rem_euclid(1.0);
        match self.scheme {
            PaletteScheme::Analogous => (0..count)
                .map(|i| Color::from_hsv(hue(h + i as f32 * 0.1), s, v))
                .collect(),
            PaletteScheme::Complementary => (0..count)
                .map(|i| match i {
                    0 => self.base,
                    1 => Color::from_hsv(hue(h + 0.5), s, v),
                    _ => Color::from_hsv(hue(h + i as f32 * 0.15), s * 0.8, v),
                })
                .collect(),
            PaletteScheme::Triadic => (0..count)
                .map(|i| match i {
                    0 => self.base,
                    1 => Color::from_hsv(hue(h + 1.0 / 3.0), s, v),
                    2 => Color::from_hsv(hue(h + 2.0 / 3.0), s, v),
                    _ => Color::from_hsv(hue(h + i as f32 * 0.1), s * 0.7, v),
                })
                .collect(),
            PaletteScheme::Rainbow => (0..count)
                .map(|i| Color::from_hsv(i as f32 / count as f32, 0.8, 0.9))
                .collect(),
            PaletteScheme::Gradient => (0..count)
                .map(|i| {
                    let f = i as f32 / (count.saturating_sub(1)).max(1) as f32;
                    Color::from_hsv(h, s * (0.5 + 0.5 * f), v * (0.3 + 0.7 * f))
                })
                .collect(),
            PaletteScheme::Distinct => (0..count)
                .map(|i| match DISTINCT.get(i) {
                    Some(&hex) => Color::from_u32(hex),
                    None => Color::from_hsv(hue(i as f32 * GOLDEN), 0.7, 0.8),
                })
                .collect(),
        }
    }
}
