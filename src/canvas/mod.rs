//! # Page Canvas
//!
//! Everything drawn onto a page is first recorded as a [`DrawOp`] on a
//! [`PageCanvas`]. Coordinates are PDF user space: points, origin at the
//! bottom-left of the page, y growing upward. The [`pdf`] module turns the
//! recorded pages into a PDF file.
//!
//! ```
//! use quire::canvas::{PageCanvas, Stroke};
//! use quire::color::Color;
//!
//! let mut canvas = PageCanvas::new(612.0, 792.0);
//! canvas.fill_rect(72.0, 72.0, 100.0, 20.0, Color::BLACK);
//! canvas.line(72.0, 60.0, 172.0, 60.0, Stroke::solid(Color::BLACK, 1.0));
//! assert_eq!(canvas.ops().len(), 2);
//! ```

pub mod pdf;

use std::sync::Arc;

use image::DynamicImage;

use crate::color::Color;
use crate::config::HAlign;
use crate::error::QuireError;
use crate::text::Font;

/// Outline attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// `(on, off)` dash lengths.
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

/// Decoded RGB(A) pixels ready to embed. `key` identifies identical images
/// so each is stored once per file.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    pub fn from_dynamic(key: impl Into<String>, img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for px in rgba.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }
        let alpha = alpha.iter().any(|&a| a != 255).then_some(alpha);
        Self {
            key: key.into(),
            width,
            height,
            rgb,
            alpha,
        }
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn decode(key: impl Into<String>, bytes: &[u8]) -> Result<Self, QuireError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(key, &img))
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate {
        dx: f32,
        dy: f32,
    },
    /// Counter-clockwise rotation about the current origin.
    Rotate {
        degrees: f32,
    },
    /// Fill and stroke opacity until the next `Restore`.
    SetAlpha(f32),
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    RoundRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Single-line text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    Image {
        image: Arc<RasterImage>,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    /// Clickable URI area; produces an annotation, not content.
    Link {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        url: String,
    },
}

/// Ops recorded for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCanvas {
    pub width: f32,
    pub height: f32,
    ops: Vec<DrawOp>,
}

impl PageCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = DrawOp>) {
        self.ops.extend(ops);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            fill: Some(color),
            stroke: None,
        });
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: Stroke) {
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            fill: None,
            stroke: Some(stroke),
        });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Color, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text,
        });
    }

    /// Text anchored at `x` according to `align` (left edge, center, or right edge).
    pub fn text_aligned(
        &mut self,
        x: f32,
        y: f32,
        align: HAlign,
        font: Font,
        size: f32,
        color: Color,
        text: &str,
    ) {
        let w = font.text_width(text, size);
        let left = match align {
            HAlign::Center => x - w / 2.0,
            HAlign::Right => x - w,
            HAlign::Left | HAlign::Justify => x,
        };
        self.text(left, y, font, size, color, text);
    }
}
