//! Page furniture configuration: watermark, header, footer, background, border.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HAlign;
use crate::color::Color;
use crate::error::QuireError;

fn default_opacity() -> f32 {
    0.2
}

fn default_text_rotation() -> f32 {
    45.0
}

fn default_watermark_font_size() -> f32 {
    40.0
}

fn default_watermark_color() -> Color {
    Color::from_u32(0x808080)
}

fn default_image_side() -> f32 {
    150.0
}

/// A watermark painted across every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkConfig {
    Text {
        text: String,
        #[serde(default = "default_opacity")]
        opacity: f32,
        #[serde(default = "default_text_rotation")]
        rotation: f32,
        #[serde(default = "default_watermark_font_size")]
        font_size: f32,
        #[serde(default = "default_watermark_color")]
        color: Color,
    },
    Image {
        url: String,
        #[serde(default = "default_opacity")]
        opacity: f32,
        #[serde(default)]
        rotation: f32,
        #[serde(default = "default_image_side")]
        width: f32,
        #[serde(default = "default_image_side")]
        height: f32,
    },
}

impl WatermarkConfig {
    pub fn text(text: impl Into<String>) -> Self {
        WatermarkConfig::Text {
            text: text.into(),
            opacity: default_opacity(),
            rotation: default_text_rotation(),
            font_size: default_watermark_font_size(),
            color: default_watermark_color(),
        }
    }

    /// Short label used in build reports (`text` or `image`).
    pub fn kind(&self) -> &'static str {
        match self {
            WatermarkConfig::Text { .. } => "text",
            WatermarkConfig::Image { .. } => "image",
        }
    }

    /// Pre-flight check of a raw watermark record, then typed parse.
    ///
    /// Rejections carry the messages callers see in an error result.
    pub fn from_value(value: &Value) -> Result<Self, QuireError> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
        let has = |field: &str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        };
        match kind {
            "text" if !has("text") => Err(QuireError::Validation(
                "Text watermark requires text field".into(),
            )),
            "image" if !has("url") => Err(QuireError::Validation(
                "Image watermark requires url field".into(),
            )),
            "text" | "image" => Ok(serde_json::from_value(value.clone())?),
            _ => Err(QuireError::Validation("Invalid watermark type".into())),
        }
    }
}

fn default_furniture_align() -> HAlign {
    HAlign::Center
}

fn default_page_format() -> String {
    "Page {page}".into()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_furniture_align")]
    pub alignment: HAlign,
}

impl HeaderConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: HAlign::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterConfig {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_furniture_align")]
    pub alignment: HAlign,
    #[serde(default = "default_true")]
    pub page_numbers: bool,
    /// `{page}` and `{total}` are substituted.
    #[serde(default = "default_page_format")]
    pub page_number_format: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            alignment: HAlign::Center,
            page_numbers: true,
            page_number_format: default_page_format(),
        }
    }
}

impl FooterConfig {
    pub fn page_label(&self, page: usize, total: usize) -> String {
        self.page_number_format
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
}

fn default_gradient_start() -> Color {
    Color::WHITE
}

fn default_gradient_end() -> Color {
    Color::from_u32(0xF0F0F0)
}

fn default_background_color() -> Color {
    Color::WHITE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundConfig {
    Solid {
        #[serde(default = "default_background_color")]
        color: Color,
    },
    Gradient {
        #[serde(default = "default_gradient_start")]
        start_color: Color,
        #[serde(default = "default_gradient_end")]
        end_color: Color,
        #[serde(default)]
        direction: GradientDirection,
    },
}

impl BackgroundConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackgroundConfig::Solid { .. } => "solid",
            BackgroundConfig::Gradient { .. } => "gradient",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Decorative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub style: BorderStyle,
    pub color: Color,
    pub width: f32,
    pub margin_inches: f32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            style: BorderStyle::Single,
            color: Color::from_u32(0x333333),
            width: 1.5,
            margin_inches: 0.2,
        }
    }
}

impl BorderConfig {
    /// Inset of the border from the page edge, in points.
    pub fn margin(&self) -> f32 {
        self.margin_inches * 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_watermark_text_requires_text() {
        let err = WatermarkConfig::from_value(&json!({"type": "text"})).unwrap_err();
        assert!(err.to_string().contains("Text watermark requires text field"));
    }

    #[test]
    fn test_watermark_image_requires_url() {
        let err = WatermarkConfig::from_value(&json!({"type": "image"})).unwrap_err();
        assert!(err.to_string().contains("Image watermark requires url field"));
    }

    #[test]
    fn test_watermark_image_with_url_accepted() {
        let wm = WatermarkConfig::from_value(&json!({"type": "image", "url": "http://x"})).unwrap();
        match wm {
            WatermarkConfig::Image { url, opacity, rotation, width, .. } => {
                assert_eq!(url, "http://x");
                assert_eq!(opacity, 0.2);
                assert_eq!(rotation, 0.0);
                assert_eq!(width, 150.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_watermark_unknown_type() {
        let err = WatermarkConfig::from_value(&json!({"type": "stamp", "text": "x"})).unwrap_err();
        assert!(err.to_string().contains("Invalid watermark type"));
        assert!(WatermarkConfig::from_value(&json!({})).is_err());
    }

    #[test]
    fn test_watermark_text_defaults() {
        let wm = WatermarkConfig::from_value(&json!({"type": "text", "text": "DRAFT"})).unwrap();
        assert_eq!(wm, WatermarkConfig::text("DRAFT"));
    }

    #[test]
    fn test_footer_page_label() {
        let footer = FooterConfig {
            page_number_format: "Page {page} of {total}".into(),
            ..Default::default()
        };
        assert_eq!(footer.page_label(2, 5), "Page 2 of 5");
        assert_eq!(FooterConfig::default().page_label(3, 9), "Page 3");
    }

    #[test]
    fn test_background_gradient_defaults() {
        let bg: BackgroundConfig = serde_json::from_value(json!({"type": "gradient"})).unwrap();
        assert_eq!(
            bg,
            BackgroundConfig::Gradient {
                start_color: Color::WHITE,
                end_color: Color::from_u32(0xF0F0F0),
                direction: GradientDirection::Vertical,
            }
        );
    }
}
