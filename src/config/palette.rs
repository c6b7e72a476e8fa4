use serde::{Deserialize, Serialize};

use super::ColorScheme;
use crate::color::Color;

/// The ten color roles every style and processor draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: Color::from_u32(0x00008B),
            secondary: Color::from_u32(0xADD8E6),
            accent: Color::from_u32(0xFFA500),
            background: Color::WHITE,
            text: Color::BLACK,
            muted: Color::from_u32(0x808080),
            success: Color::from_u32(0x008000),
            warning: Color::from_u32(0xFFA500),
            error: Color::from_u32(0xFF0000),
            info: Color::from_u32(0x0000FF),
        }
    }
}

impl ColorPalette {
    /// Palette for `scheme`. Schemes without their own colors keep the defaults.
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        let [primary, secondary, accent, background, text] = match scheme {
            ColorScheme::Classic => [0x00008B, 0xADD8E6, 0xFFD700, 0xFFFFFF, 0x000000],
            ColorScheme::Modern => [0x2E86AB, 0xA23B72, 0xF18F01, 0xF5F5F5, 0x333333],
            ColorScheme::Vibrant => [0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0xFFFFFF, 0x2C3E50],
            ColorScheme::Pastel => [0xFFB3BA, 0xFFDFBA, 0xFFFFBA, 0xFEFEFE, 0x5D5D5D],
            ColorScheme::CorporateBlue => [0x003366, 0x0066CC, 0xFF9900, 0xFFFFFF, 0x333333],
            ColorScheme::Nature => [0x2E7D32, 0x66BB6A, 0xFFC107, 0xF1F8E9, 0x1B5E20],
            ColorScheme::Monochrome | ColorScheme::Sunset | ColorScheme::Ocean | ColorScheme::Forest => {
                return Self::default();
            }
        };
        Self {
            primary: Color::from_u32(primary),
            secondary: Color::from_u32(secondary),
            accent: Color::from_u32(accent),
            background: Color::from_u32(background),
            text: Color::from_u32(text),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_overrides_first_five_roles() {
        let p = ColorPalette::for_scheme(ColorScheme::Modern);
        assert_eq!(p.primary.to_hex(), "#2E86AB");
        assert_eq!(p.text.to_hex(), "#333333");
        assert_eq!(p.muted, ColorPalette::default().muted);
    }

    #[test]
    fn test_unlisted_scheme_uses_defaults() {
        assert_eq!(ColorPalette::for_scheme(ColorScheme::Ocean), ColorPalette::default());
    }
}
