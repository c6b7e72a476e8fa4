//! # Page Decoration Pipeline
//!
//! Page furniture painted beneath the story on every page, always in the
//! same order:
//!
//! ```text
//!   background ─▶ border ─▶ watermark ─▶ header ─▶ footer
//! ```
//!
//! Steps are resolved once from the [`DocumentConfig`] (an image watermark
//! is downloaded here, not per page). Each step paints independently: a
//! failing step is logged and the next one still runs.

use std::sync::Arc;

use crate::canvas::{DrawOp, PageCanvas, RasterImage, Stroke};
use crate::color::Color;
use crate::config::{
    BackgroundConfig, BorderConfig, BorderStyle, DocumentConfig, FooterConfig, HAlign, HeaderConfig, INCH,
    WatermarkConfig,
};
use crate::error::QuireError;
use crate::fetch::Fetch;
use crate::primitives::paint_gradient;
use crate::text::Font;

const FURNITURE_FONT: Font = Font::Helvetica;
const FURNITURE_SIZE: f32 = 9.0;
const FURNITURE_COLOR: Color = Color::from_u32(0xA9A9A9);
const HEADER_DROP: f32 = 40.0;
const FOOTER_RISE: f32 = 40.0;
const PAGE_NUMBER_RISE: f32 = 25.0;
const DOUBLE_INSET: f32 = 6.0;
const CORNER: f32 = 15.0;

/// Where a page sits in the finished document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub width: f32,
    pub height: f32,
}

enum Step {
    Background(BackgroundConfig),
    Border(BorderConfig),
    TextWatermark {
        text: String,
        opacity: f32,
        rotation: f32,
        font_size: f32,
        color: Color,
    },
    ImageWatermark {
        image: Result<Arc<RasterImage>, String>,
        opacity: f32,
        rotation: f32,
        width: f32,
        height: f32,
    },
    Header(HeaderConfig),
    Footer(FooterConfig),
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Background(_) => "background",
            Step::Border(_) => "border",
            Step::TextWatermark { .. } | Step::ImageWatermark { .. } => "watermark",
            Step::Header(_) => "header",
            Step::Footer(_) => "footer",
        }
    }

    fn paint(&self, canvas: &mut PageCanvas, page: &PageInfo) -> Result<(), QuireError> {
        let (w, h) = (page.width, page.height);
        match self {
            Step::Background(BackgroundConfig::Solid { color }) => canvas.fill_rect(0.0, 0.0, w, h, *color),
            Step::Background(BackgroundConfig::Gradient {
                start_color,
                end_color,
                direction,
            }) => paint_gradient(canvas, 0.0, 0.0, w, h, *start_color, *end_color, *direction),
            Step::Border(border) => paint_border(canvas, border, w, h),
            Step::TextWatermark {
                text,
                opacity,
                rotation,
                font_size,
                color,
            } => {
                canvas.extend([
                    DrawOp::Save,
                    DrawOp::SetAlpha(*opacity),
                    DrawOp::Translate { dx: w / 2.0, dy: h / 2.0 },
                    DrawOp::Rotate { degrees: *rotation },
                ]);
                canvas.text_aligned(0.0, 0.0, HAlign::Center, Font::HelveticaBold, *font_size, *color, text);
                canvas.push(DrawOp::Restore);
            }
            Step::ImageWatermark {
                image,
                opacity,
                rotation,
                width,
                height,
            } => {
                let image = image.as_ref().map_err(|e| QuireError::Fetch(e.clone()))?;
                canvas.extend([
                    DrawOp::Save,
                    DrawOp::SetAlpha(*opacity),
                    DrawOp::Translate { dx: w / 2.0, dy: h / 2.0 },
                    DrawOp::Rotate { degrees: *rotation },
                    DrawOp::Image {
                        image: Arc::clone(image),
                        x: -width / 2.0,
                        y: -height / 2.0,
                        w: *width,
                        h: *height,
                    },
                    DrawOp::Restore,
                ]);
            }
            Step::Header(header) => {
                furniture_text(canvas, &header.text, header.alignment, w, h - HEADER_DROP);
            }
            Step::Footer(footer) => {
                furniture_text(canvas, &footer.text, footer.alignment, w, FOOTER_RISE);
                if footer.page_numbers {
                    let label = footer.page_label(page.number, page.total);
                    canvas.text_aligned(
                        w - INCH,
                        PAGE_NUMBER_RISE,
                        HAlign::Right,
                        FURNITURE_FONT,
                        FURNITURE_SIZE,
                        FURNITURE_COLOR,
                        &label,
                    );
                }
            }
        }
        Ok(())
    }
}

fn furniture_text(canvas: &mut PageCanvas, text: &str, align: HAlign, page_w: f32, y: f32) {
    if text.trim().is_empty() {
        return;
    }
    let x = match align {
        HAlign::Center => page_w / 2.0,
        HAlign::Right => page_w - INCH,
        HAlign::Left | HAlign::Justify => INCH,
    };
    canvas.text_aligned(x, y, align, FURNITURE_FONT, FURNITURE_SIZE, FURNITURE_COLOR, text);
}

fn paint_border(canvas: &mut PageCanvas, border: &BorderConfig, w: f32, h: f32) {
    let m = border.margin();
    let (x1, y1, x2, y2) = (m, m, w - m, h - m);
    let stroke = Stroke::solid(border.color, border.width);
    canvas.stroke_rect(x1, y1, x2 - x1, y2 - y1, stroke);

    match border.style {
        BorderStyle::Single => {}
        BorderStyle::Double => {
            let i = DOUBLE_INSET;
            canvas.stroke_rect(x1 + i, y1 + i, x2 - x1 - 2.0 * i, y2 - y1 - 2.0 * i, stroke);
        }
        BorderStyle::Decorative => {
            let heavy = Stroke::solid(border.color, border.width + 0.5);
            // corner, then the horizontal and vertical arm directions
            let corners = [
                (x1, y2, 1.0, -1.0),
                (x2, y2, -1.0, -1.0),
                (x1, y1, 1.0, 1.0),
                (x2, y1, -1.0, 1.0),
            ];
            for (cx, cy, sx, sy) in corners {
                canvas.line(cx, cy, cx + sx * CORNER, cy, heavy);
                canvas.line(cx, cy, cx, cy + sy * CORNER, heavy);
            }
        }
    }
}

/// The resolved furniture steps of one document.
pub struct DecorationPipeline {
    steps: Vec<Step>,
}

impl DecorationPipeline {
    pub fn new(config: &DocumentConfig, fetcher: &dyn Fetch) -> Self {
        let mut steps = Vec::new();
        if let Some(bg) = &config.background {
            steps.push(Step::Background(bg.clone()));
        }
        if let Some(border) = &config.border {
            steps.push(Step::Border(border.clone()));
        }
        match &config.watermark {
            Some(WatermarkConfig::Text {
                text,
                opacity,
                rotation,
                font_size,
                color,
            }) => steps.push(Step::TextWatermark {
                text: text.clone(),
                opacity: opacity.clamp(0.0, 1.0),
                rotation: *rotation,
                font_size: *font_size,
                color: *color,
            }),
            Some(WatermarkConfig::Image {
                url,
                opacity,
                rotation,
                width,
                height,
            }) => {
                let image = fetcher
                    .load(url)
                    .and_then(|bytes| RasterImage::decode(url.as_str(), &bytes))
                    .map(Arc::new)
                    .map_err(|e| {
                        log::warn!("watermark image {} unavailable: {}", url, e);
                        e.to_string()
                    });
                steps.push(Step::ImageWatermark {
                    image,
                    opacity: opacity.clamp(0.0, 1.0),
                    rotation: *rotation,
                    width: *width,
                    height: *height,
                });
            }
            None => {}
        }
        if let Some(header) = &config.header {
            steps.push(Step::Header(header.clone()));
        }
        if let Some(footer) = &config.footer {
            steps.push(Step::Footer(footer.clone()));
        }
        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in paint order.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Paint every step onto `canvas`, logging and skipping any that fail.
    pub fn paint(&self, canvas: &mut PageCanvas, page: &PageInfo) {
        for step in &self.steps {
            if let Err(e) = step.paint(canvas, page) {
                log::error!("Error adding {}: {}", step.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradientDirection;
    use crate::fetch::MemoryFetcher;
    use pretty_assertions::assert_eq;

    const PAGE: PageInfo = PageInfo {
        number: 2,
        total: 5,
        width: 612.0,
        height: 792.0,
    };

    fn paint(config: &DocumentConfig, fetcher: &MemoryFetcher) -> Vec<DrawOp> {
        let pipeline = DecorationPipeline::new(config, fetcher);
        let mut canvas = PageCanvas::new(PAGE.width, PAGE.height);
        pipeline.paint(&mut canvas, &PAGE);
        canvas.into_ops()
    }

    fn texts(ops: &[DrawOp]) -> Vec<(f32, f32, String)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_steps_run_in_fixed_order() {
        let mut config = DocumentConfig::default();
        config.footer = Some(FooterConfig::default());
        config.header = Some(HeaderConfig::new("Confidential"));
        config.watermark = Some(WatermarkConfig::text("DRAFT"));
        config.border = Some(BorderConfig::default());
        config.background = Some(BackgroundConfig::Solid { color: Color::WHITE });
        let pipeline = DecorationPipeline::new(&config, &MemoryFetcher::new());
        assert_eq!(pipeline.names(), vec!["background", "border", "watermark", "header", "footer"]);
    }

    #[test]
    fn test_header_and_page_number_positions() {
        let mut config = DocumentConfig::default();
        config.header = Some(HeaderConfig {
            text: "Left head".into(),
            alignment: HAlign::Left,
        });
        config.footer = Some(FooterConfig {
            page_number_format: "Page {page} of {total}".into(),
            ..Default::default()
        });
        let ops = paint(&config, &MemoryFetcher::new());
        let texts = texts(&ops);
        assert_eq!(texts.len(), 2);
        assert_eq!((texts[0].0, texts[0].1), (72.0, 752.0));
        assert_eq!(texts[1].2, "Page 2 of 5");
        assert_eq!(texts[1].1, 25.0);
        let width = FURNITURE_FONT.text_width("Page 2 of 5", FURNITURE_SIZE);
        assert!((texts[1].0 + width - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_gradient_background_bands() {
        let mut config = DocumentConfig::default();
        config.background = Some(BackgroundConfig::Gradient {
            start_color: Color::WHITE,
            end_color: Color::BLACK,
            direction: GradientDirection::Vertical,
        });
        let ops = paint(&config, &MemoryFetcher::new());
        assert_eq!(ops.len(), 50);
    }

    #[test]
    fn test_border_styles() {
        let mut config = DocumentConfig::default();
        config.border = Some(BorderConfig {
            style: BorderStyle::Double,
            ..Default::default()
        });
        let ops = paint(&config, &MemoryFetcher::new());
        assert_eq!(ops.len(), 2);
        match &ops[1] {
            DrawOp::Rect { x, .. } => assert!((x - (14.4 + 6.0)).abs() < 1e-3),
            other => panic!("unexpected {:?}", other),
        }

        config.border = Some(BorderConfig {
            style: BorderStyle::Decorative,
            ..Default::default()
        });
        let ops = paint(&config, &MemoryFetcher::new());
        let lines = ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
        assert_eq!(lines, 8);
    }

    #[test]
    fn test_text_watermark_rotated_with_alpha() {
        let mut config = DocumentConfig::default();
        config.watermark = Some(WatermarkConfig::text("DRAFT"));
        let ops = paint(&config, &MemoryFetcher::new());
        assert_eq!(ops[0], DrawOp::Save);
        assert_eq!(ops[1], DrawOp::SetAlpha(0.2));
        assert_eq!(ops[3], DrawOp::Rotate { degrees: 45.0 });
        assert_eq!(ops.last(), Some(&DrawOp::Restore));
    }

    #[test]
    fn test_missing_watermark_image_does_not_stop_footer() {
        let mut config = DocumentConfig::default();
        config.watermark = Some(serde_json::from_value(serde_json::json!({"type": "image", "url": "http://x"})).unwrap());
        config.footer = Some(FooterConfig::default());
        let ops = paint(&config, &MemoryFetcher::new());
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
        assert_eq!(texts(&ops)[0].2, "Page 2");
    }
}
