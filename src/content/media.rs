//! Media content: fetched or local images, QR codes and signature lines.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{ContentMeta, Process, non_blank};
use crate::canvas::RasterImage;
use crate::chart::caption_paragraph;
use crate::config::HAlign;
use crate::context::RenderContext;
use crate::element::{Element, ImageBlock, Paragraph};
use crate::error::{QuireError, Skip};
use crate::fetch::is_remote;
use crate::output::OutputKind;
use crate::style::TextStyle;
use crate::text::Font;

/// Decode an image from a URL or local path. Downloads are also kept under
/// the images output directory.
pub(crate) fn load_image(source: &str, ctx: &RenderContext) -> Result<Arc<RasterImage>, QuireError> {
    let bytes = ctx.fetcher.load(source)?;
    if is_remote(source) {
        let ext = if source.to_ascii_lowercase().ends_with(".png") {
            "png"
        } else {
            "jpg"
        };
        match ctx.output.save(OutputKind::Images, "image", ext, &bytes) {
            Ok(path) => log::debug!("saved {} to {}", source, path.display()),
            Err(e) => log::warn!("could not keep a copy of {}: {}", source, e),
        }
    }
    Ok(Arc::new(RasterImage::decode(source, &bytes)?))
}

// ============================================================================
// IMAGE
// ============================================================================

/// Horizontal placement of an image block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePosition {
    #[default]
    Left,
    Center,
    Right,
}

impl ImagePosition {
    pub fn name(self) -> &'static str {
        match self {
            ImagePosition::Left => "left",
            ImagePosition::Center => "center",
            ImagePosition::Right => "right",
        }
    }

    fn halign(self) -> HAlign {
        match self {
            ImagePosition::Left => HAlign::Left,
            ImagePosition::Center => HAlign::Center,
            ImagePosition::Right => HAlign::Right,
        }
    }
}

impl Serialize for ImagePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown placements read as left.
impl<'de> Deserialize<'de> for ImagePosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => ImagePosition::Center,
            "right" => ImagePosition::Right,
            _ => ImagePosition::Left,
        })
    }
}

fn default_image_side() -> f32 {
    150.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Remote source; wins over `path`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_image_side")]
    pub width: f32,
    #[serde(default = "default_image_side")]
    pub height: f32,
    #[serde(default, alias = "align")]
    pub alignment: ImagePosition,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Default for ImageContent {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            width: default_image_side(),
            height: default_image_side(),
            alignment: ImagePosition::Left,
            caption: None,
        }
    }
}

impl ImageContent {
    pub fn from_source(source: impl Into<String>) -> Self {
        let source = source.into();
        if is_remote(&source) {
            Self {
                url: Some(source),
                ..Default::default()
            }
        } else {
            Self {
                path: Some(source),
                ..Default::default()
            }
        }
    }

    fn source(&self) -> Option<&str> {
        self.url
            .as_deref()
            .and_then(non_blank)
            .or_else(|| self.path.as_deref().and_then(non_blank))
    }
}

impl ContentMeta for ImageContent {
    fn label() -> &'static str {
        "Image"
    }
}

impl Process for ImageContent {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let source = self.source().ok_or_else(|| Skip::new("image needs a url or path"))?;
        let image = load_image(source, ctx).map_err(|e| Skip::new(format!("Error processing image {}: {}", source, e)))?;

        let align = self.alignment.halign();
        let mut out = vec![
            Element::Spacer(15.0),
            ImageBlock::new(image, self.width.max(1.0), self.height.max(1.0))
                .align(align)
                .into(),
        ];
        if let Some(caption) = self.caption.as_deref().and_then(non_blank) {
            out.push(Element::Spacer(8.0));
            out.push(caption_paragraph(caption, align));
        }
        out.push(Element::Spacer(15.0));
        Ok(out)
    }
}

// ============================================================================
// QR CODE
// ============================================================================

const QR_MODULE_PX: u32 = 8;
const QR_QUIET_ZONE: u32 = 4;

fn default_qr_size() -> f32 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    #[serde(default)]
    pub data: String,
    /// Side of the square in points.
    #[serde(default = "default_qr_size")]
    pub size: f32,
    #[serde(default)]
    pub caption: Option<String>,
}

impl QrCode {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            size: default_qr_size(),
            caption: None,
        }
    }

    /// Rasterize the symbol with a white quiet zone.
    pub fn rasterize(&self) -> Result<RasterImage, QuireError> {
        let code = qrcode::QrCode::new(self.data.as_bytes())
            .map_err(|e| QuireError::Image(format!("QR code generation failed: {}", e)))?;
        let modules = code.width() as u32;
        let side = (modules + 2 * QR_QUIET_ZONE) * QR_MODULE_PX;

        let img = GrayImage::from_fn(side, side, |px, py| {
            let qx = (px / QR_MODULE_PX).checked_sub(QR_QUIET_ZONE);
            let qy = (py / QR_MODULE_PX).checked_sub(QR_QUIET_ZONE);
            let dark = match (qx, qy) {
                (Some(qx), Some(qy)) if qx < modules && qy < modules => {
                    code[(qx as usize, qy as usize)] == qrcode::Color::Dark
                }
                _ => false,
            };
            if dark { Luma([0u8]) } else { Luma([255u8]) }
        });
        Ok(RasterImage::from_dynamic(
            format!("qr:{}", self.data),
            &DynamicImage::ImageLuma8(img),
        ))
    }
}

impl ContentMeta for QrCode {
    fn label() -> &'static str {
        "QR Code"
    }
}

impl Process for QrCode {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.data.trim().is_empty() {
            return Err(Skip::new("QR code has no data"));
        }
        let image = self.rasterize()?;
        let side = self.size.max(1.0);

        let mut out = vec![
            Element::Spacer(15.0),
            ImageBlock::new(Arc::new(image), side, side).align(HAlign::Center).into(),
        ];
        if let Some(caption) = self.caption.as_deref().and_then(non_blank) {
            out.push(Element::Spacer(8.0));
            out.push(caption_paragraph(caption, HAlign::Center));
        }
        out.push(Element::Spacer(15.0));
        Ok(out)
    }
}

// ============================================================================
// SIGNATURE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePosition {
    BottomLeft,
    #[default]
    BottomRight,
    TopLeft,
    TopRight,
    Center,
}

impl SignaturePosition {
    pub const ALL: &'static [SignaturePosition] = &[
        SignaturePosition::BottomLeft,
        SignaturePosition::BottomRight,
        SignaturePosition::TopLeft,
        SignaturePosition::TopRight,
        SignaturePosition::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignaturePosition::BottomLeft => "bottom-left",
            SignaturePosition::BottomRight => "bottom-right",
            SignaturePosition::TopLeft => "top-left",
            SignaturePosition::TopRight => "top-right",
            SignaturePosition::Center => "center",
        }
    }

    fn is_top(self) -> bool {
        matches!(self, SignaturePosition::TopLeft | SignaturePosition::TopRight)
    }

    fn halign(self) -> HAlign {
        match self {
            SignaturePosition::BottomLeft | SignaturePosition::TopLeft => HAlign::Left,
            SignaturePosition::BottomRight | SignaturePosition::TopRight => HAlign::Right,
            SignaturePosition::Center => HAlign::Center,
        }
    }
}

impl fmt::Display for SignaturePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignaturePosition {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| QuireError::Validation(format!("invalid signature position '{}'", s)))
    }
}

impl Serialize for SignaturePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Invalid positions fall back to bottom-right.
impl<'de> Deserialize<'de> for SignaturePosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|e| {
            log::warn!("{}, using bottom-right", e);
            SignaturePosition::BottomRight
        }))
    }
}

fn default_signature_text() -> String {
    "Digitally Signed".to_string()
}

fn default_signature_size() -> Value {
    Value::from(10)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default = "default_signature_text")]
    pub text: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub position: SignaturePosition,
    /// Any JSON value. Numbers and integer strings are truncated and clamped
    /// to 6..=20; anything else reads as 10.
    #[serde(default = "default_signature_size")]
    pub font_size: Value,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            text: default_signature_text(),
            date: None,
            position: SignaturePosition::default(),
            font_size: default_signature_size(),
        }
    }
}

impl Signature {
    pub fn size(&self) -> f32 {
        let size = match &self.font_size {
            Value::Number(n) => n.as_f64().map(f64::trunc),
            Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n as f64),
            _ => None,
        };
        size.filter(|s| s.is_finite())
            .map(|s| s.clamp(6.0, 20.0) as f32)
            .unwrap_or(10.0)
    }

    pub fn line(&self) -> Option<String> {
        let text = non_blank(&self.text)?;
        Some(match self.date.as_deref().and_then(non_blank) {
            Some(date) => format!("{} on {}", text, date),
            None => text.to_string(),
        })
    }
}

impl ContentMeta for Signature {
    fn label() -> &'static str {
        "Signature"
    }
}

impl Process for Signature {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let line = self.line().ok_or_else(|| Skip::new("signature text is empty"))?;
        let size = self.size();
        let style = TextStyle::new(Font::HelveticaOblique, size)
            .align(self.position.halign())
            .spacing(6.0, 6.0);
        let before = if self.position.is_top() { 12.0 } else { 30.0 };
        Ok(vec![
            Element::Spacer(before),
            Paragraph::plain(&line, &style).into(),
            Element::Spacer(12.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::fetch::MemoryFetcher;
    use crate::output::OutputDirs;
    use crate::style::StyleSheet;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([10, 120, 200]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn with_ctx<T>(fetcher: MemoryFetcher, f: impl FnOnce(&RenderContext, &std::path::Path) -> T) -> T {
        let tmp = tempfile::tempdir().unwrap();
        let config = DocumentConfig::default();
        let sheet = StyleSheet::resolve(&config);
        let output = OutputDirs::new(tmp.path());
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        f(&ctx, tmp.path())
    }

    #[test]
    fn test_remote_image_saved_and_aligned() {
        let fetcher = MemoryFetcher::new().with("https://x.test/logo.png", png_bytes(4, 2));
        let content: ImageContent = serde_json::from_value(json!({
            "url": "https://x.test/logo.png", "alignment": "right", "caption": "Logo"
        }))
        .unwrap();
        with_ctx(fetcher, |ctx, root| {
            let out = content.process(ctx).unwrap();
            let kinds: Vec<&str> = out.iter().map(Element::kind).collect();
            assert_eq!(kinds, vec!["spacer", "image", "spacer", "paragraph", "spacer"]);
            let Element::Image(block) = &out[1] else { panic!("expected image") };
            assert_eq!((block.width, block.height), (150.0, 150.0));
            assert_eq!(block.align, HAlign::Right);
            let Element::Paragraph(caption) = &out[3] else { panic!("expected caption") };
            assert_eq!(caption.style.align, HAlign::Right);

            let saved: Vec<_> = std::fs::read_dir(root.join("images")).unwrap().collect();
            assert_eq!(saved.len(), 1);
            let name = saved[0].as_ref().unwrap().file_name().into_string().unwrap();
            assert!(name.starts_with("image_") && name.ends_with(".png"));
        });
    }

    #[test]
    fn test_failed_fetch_skips() {
        let content = ImageContent::from_source("https://x.test/missing.jpg");
        let out = with_ctx(MemoryFetcher::new(), |ctx, _| content.process(ctx));
        assert!(out.is_err());
        let none = ImageContent::default();
        assert!(with_ctx(MemoryFetcher::new(), |ctx, _| none.process(ctx)).is_err());
    }

    #[test]
    fn test_local_image_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pic.png");
        std::fs::write(&path, png_bytes(3, 3)).unwrap();
        let content = ImageContent::from_source(path.to_string_lossy());
        let out = with_ctx(MemoryFetcher::new(), |ctx, _| content.process(ctx)).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_qr_rasterizes_with_quiet_zone() {
        let qr = QrCode::new("https://example.com");
        let img = qr.rasterize().unwrap();
        assert_eq!(img.width, img.height);
        assert_eq!(img.width % QR_MODULE_PX, 0);
        // top-left pixel sits in the quiet zone
        assert_eq!(&img.rgb[..3], &[255, 255, 255]);
        assert!(img.rgb.iter().any(|&b| b == 0));

        let out = with_ctx(MemoryFetcher::new(), |ctx, _| qr.process(ctx)).unwrap();
        let Element::Image(block) = &out[1] else { panic!("expected image") };
        assert_eq!(block.width, 100.0);
        assert!(with_ctx(MemoryFetcher::new(), |ctx, _| QrCode::new("").process(ctx)).is_err());
    }

    #[test]
    fn test_signature_defaults_and_clamp() {
        let sig: Signature = serde_json::from_value(json!({"date": "2024-05-01", "font_size": 40})).unwrap();
        assert_eq!(sig.line().as_deref(), Some("Digitally Signed on 2024-05-01"));
        assert_eq!(sig.size(), 20.0);
        assert_eq!(sig.position, SignaturePosition::BottomRight);

        let sig: Signature = serde_json::from_value(json!({"font_size": "big", "position": "sideways"})).unwrap();
        assert_eq!(sig.size(), 10.0);
        assert_eq!(sig.position, SignaturePosition::BottomRight);
    }

    #[test]
    fn test_signature_size_rejects_non_integers() {
        for bad in ["NaN", "nan", "inf", "-inf", "12.5", ""] {
            let sig: Signature = serde_json::from_value(json!({"font_size": bad})).unwrap();
            assert_eq!(sig.size(), 10.0, "font_size {:?}", bad);
        }
        let sig: Signature = serde_json::from_value(json!({"font_size": " 14 "})).unwrap();
        assert_eq!(sig.size(), 14.0);
        let sig: Signature = serde_json::from_value(json!({"font_size": 12.9})).unwrap();
        assert_eq!(sig.size(), 12.0);
        let sig: Signature = serde_json::from_value(json!({"font_size": "3"})).unwrap();
        assert_eq!(sig.size(), 6.0);
    }

    #[test]
    fn test_signature_layout_by_position() {
        let sig = Signature {
            position: SignaturePosition::TopLeft,
            ..Default::default()
        };
        let out = with_ctx(MemoryFetcher::new(), |ctx, _| sig.process(ctx)).unwrap();
        assert_eq!(out[0], Element::Spacer(12.0));
        let Element::Paragraph(p) = &out[1] else { panic!("expected paragraph") };
        assert_eq!(p.style.align, HAlign::Left);
        assert_eq!(p.style.font, Font::HelveticaOblique);

        let sig = Signature {
            position: "center".parse().unwrap(),
            ..Default::default()
        };
        let out = with_ctx(MemoryFetcher::new(), |ctx, _| sig.process(ctx)).unwrap();
        assert_eq!(out[0], Element::Spacer(30.0));
        assert_eq!(out[2], Element::Spacer(12.0));
    }
}
