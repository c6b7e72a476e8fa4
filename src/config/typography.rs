use serde::{Deserialize, Serialize};

use crate::text::Font;

/// Font choices and the modular type scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub primary_font: Font,
    pub secondary_font: Font,
    pub monospace_font: Font,
    pub base_size: f32,
    pub scale_ratio: f32,
    pub line_height: f32,
    pub paragraph_spacing: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            primary_font: Font::Helvetica,
            secondary_font: Font::HelveticaOblique,
            monospace_font: Font::Courier,
            base_size: 12.0,
            scale_ratio: 1.414,
            line_height: 1.5,
            paragraph_spacing: 12.0,
        }
    }
}

impl Typography {
    /// Size at scale step `level`: `round(base * ratio^level)`, base for level <= 0.
    pub fn size(&self, level: i32) -> f32 {
        if level <= 0 {
            return self.base_size;
        }
        (self.base_size * self.scale_ratio.powi(level)).round()
    }

    /// Body leading.
    pub fn leading(&self) -> f32 {
        self.base_size * self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_defaults() {
        let t = Typography::default();
        assert_eq!(t.size(0), 12.0);
        assert_eq!(t.size(1), 17.0);
        assert_eq!(t.size(2), 24.0);
        assert_eq!(t.size(3), 34.0);
        assert_eq!(t.size(-2), 12.0);
    }

    #[test]
    fn test_scale_is_monotonic() {
        let t = Typography::default();
        for n in 0..8 {
            assert!(t.size(n + 1) > t.size(n));
        }
    }
}
