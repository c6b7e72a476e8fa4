use std::sync::Arc;

use crate::canvas::{DrawOp, PageCanvas, RasterImage};
use crate::config::HAlign;

/// A raster image placed at a fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub image: Arc<RasterImage>,
    pub width: f32,
    pub height: f32,
    pub align: HAlign,
}

impl ImageBlock {
    pub fn new(image: Arc<RasterImage>, width: f32, height: f32) -> Self {
        Self {
            image,
            width,
            height,
            align: HAlign::Center,
        }
    }

    /// Largest size with the image's aspect ratio inside `max_w` x `max_h`.
    pub fn fit_within(image: Arc<RasterImage>, max_w: f32, max_h: f32) -> Self {
        let aspect = image.aspect();
        let (w, h) = if max_w / max_h > aspect {
            (max_h * aspect, max_h)
        } else {
            (max_w, max_w / aspect)
        };
        Self::new(image, w, h)
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    /// Size once scaled down to fit `avail_width`.
    pub fn fitted(&self, avail_width: f32) -> (f32, f32) {
        if self.width > avail_width && self.width > 0.0 {
            let scale = avail_width / self.width;
            (avail_width, self.height * scale)
        } else {
            (self.width, self.height)
        }
    }

    pub fn draw(&self, canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
        let (w, h) = self.fitted(avail_width);
        let dx = match self.align {
            HAlign::Center => (avail_width - w) / 2.0,
            HAlign::Right => avail_width - w,
            HAlign::Left | HAlign::Justify => 0.0,
        };
        canvas.push(DrawOp::Image {
            image: Arc::clone(&self.image),
            x: x + dx,
            y: top - h,
            w,
            h,
        });
    }
}
