//! Page geometry: size, orientation, margins and column frames.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One inch in PDF points.
pub const INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSize {
    Letter,
    A4,
    Legal,
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// Portrait dimensions in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.2756, 841.8898),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Letter
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageSizeRepr {
    Named(String),
    Dims([f32; 2]),
}

impl Serialize for PageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            PageSize::Letter => PageSizeRepr::Named("letter".into()),
            PageSize::A4 => PageSizeRepr::Named("a4".into()),
            PageSize::Legal => PageSizeRepr::Named("legal".into()),
            PageSize::Custom { width, height } => PageSizeRepr::Dims([*width, *height]),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PageSizeRepr::deserialize(deserializer)? {
            PageSizeRepr::Named(name) => match name.to_ascii_lowercase().as_str() {
                "letter" => Ok(PageSize::Letter),
                "a4" => Ok(PageSize::A4),
                "legal" => Ok(PageSize::Legal),
                other => Err(serde::de::Error::custom(format!("unknown page size '{}'", other))),
            },
            PageSizeRepr::Dims([width, height]) => Ok(PageSize::Custom { width, height }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub fn uniform(m: f32) -> Self {
        Self {
            top: m,
            bottom: m,
            left: m,
            right: m,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Margins::uniform(INCH)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub columns: usize,
    pub column_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            columns: 1,
            column_gap: 36.0,
        }
    }
}

impl LayoutConfig {
    /// Page width and height after orientation.
    pub fn page_dimensions(&self) -> (f32, f32) {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn page_width(&self) -> f32 {
        self.page_dimensions().0
    }

    pub fn page_height(&self) -> f32 {
        self.page_dimensions().1
    }

    pub fn content_width(&self) -> f32 {
        self.page_width() - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f32 {
        self.page_height() - self.margins.top - self.margins.bottom
    }

    /// Width of a single column frame.
    pub fn frame_width(&self) -> f32 {
        let cols = self.columns.max(1) as f32;
        (self.content_width() - self.column_gap * (cols - 1.0)) / cols
    }

    /// Frames on a page as `(x, y, width, height)` with a bottom-left origin.
    pub fn frames(&self) -> Vec<(f32, f32, f32, f32)> {
        let w = self.frame_width();
        let h = self.content_height();
        (0..self.columns.max(1))
            .map(|i| {
                let x = self.margins.left + i as f32 * (w + self.column_gap);
                (x, self.margins.bottom, w, h)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_defaults() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.page_dimensions(), (612.0, 792.0));
        assert_eq!(layout.content_width(), 468.0);
        assert_eq!(layout.content_height(), 648.0);
    }

    #[test]
    fn test_landscape_swaps() {
        let layout = LayoutConfig {
            orientation: Orientation::Landscape,
            ..Default::default()
        };
        assert_eq!(layout.page_dimensions(), (792.0, 612.0));
    }

    #[test]
    fn test_frames_split_content_width() {
        let layout = LayoutConfig {
            columns: 2,
            column_gap: 20.0,
            ..Default::default()
        };
        let frames = layout.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].2, 224.0);
        assert_eq!(frames[1].0, 72.0 + 224.0 + 20.0);
    }

    #[test]
    fn test_page_size_serde() {
        let named: PageSize = serde_json::from_str("\"A4\"").unwrap();
        assert_eq!(named, PageSize::A4);
        let custom: PageSize = serde_json::from_str("[400, 600]").unwrap();
        assert_eq!(custom, PageSize::Custom { width: 400.0, height: 600.0 });
        assert!(serde_json::from_str::<PageSize>("\"tabloid\"").is_err());
    }
}
