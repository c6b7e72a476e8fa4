//! # Drawable Elements
//!
//! The closed set of things a story holds. Every element can measure itself
//! against an available width and draw itself with its top-left corner at a
//! given point. Pagination only ever talks to [`Element`].
//!
//! Coordinates follow the page canvas: `top` is a PDF y coordinate and the
//! element extends downward from it.

mod image;
mod paragraph;
pub mod table;

pub use image::ImageBlock;
pub use paragraph::{Paragraph, Role};
pub use table::{Cell, CellRange, CellStyle, Side, Table, TableCmd, VAlign};

use crate::canvas::PageCanvas;
use crate::primitives::Primitive;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Paragraph(Paragraph),
    /// Vertical gap in points.
    Spacer(f32),
    Image(ImageBlock),
    Table(Table),
    Primitive(Primitive),
    PageBreak,
    /// Children that must land in the same frame when they fit in one.
    KeepTogether(Vec<Element>),
}

impl From<Paragraph> for Element {
    fn from(p: Paragraph) -> Self {
        Element::Paragraph(p)
    }
}

impl From<Table> for Element {
    fn from(t: Table) -> Self {
        Element::Table(t)
    }
}

impl From<ImageBlock> for Element {
    fn from(i: ImageBlock) -> Self {
        Element::Image(i)
    }
}

impl From<Primitive> for Element {
    fn from(p: Primitive) -> Self {
        Element::Primitive(p)
    }
}

impl Element {
    pub fn is_page_break(&self) -> bool {
        matches!(self, Element::PageBreak)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Paragraph(_) => "paragraph",
            Element::Spacer(_) => "spacer",
            Element::Image(_) => "image",
            Element::Table(_) => "table",
            Element::Primitive(_) => "primitive",
            Element::PageBreak => "page_break",
            Element::KeepTogether(_) => "keep_together",
        }
    }

    /// Box size at `avail_width`, excluding space before and after.
    pub fn measure(&self, avail_width: f32) -> Size {
        match self {
            Element::Paragraph(p) => Size::new(avail_width, p.height(avail_width)),
            Element::Spacer(h) => Size::new(avail_width, *h),
            Element::Image(img) => {
                let (w, h) = img.fitted(avail_width);
                Size::new(w, h)
            }
            Element::Table(t) => Size::new(t.width(avail_width), t.height(avail_width)),
            Element::Primitive(p) => p.size(avail_width),
            Element::PageBreak => Size::default(),
            Element::KeepTogether(children) => Size::new(avail_width, flow_height(children, avail_width)),
        }
    }

    pub fn space_before(&self) -> f32 {
        match self {
            Element::Paragraph(p) => p.style.space_before,
            _ => 0.0,
        }
    }

    pub fn space_after(&self) -> f32 {
        match self {
            Element::Paragraph(p) => p.style.space_after,
            _ => 0.0,
        }
    }

    /// Break into a head that fits `avail_height` and the remainder.
    /// Only paragraphs (by line) and tables (by row) split.
    pub fn split(&self, avail_width: f32, avail_height: f32) -> Option<(Element, Element)> {
        match self {
            Element::Paragraph(p) => p
                .split(avail_width, avail_height)
                .map(|(a, b)| (Element::Paragraph(a), Element::Paragraph(b))),
            Element::Table(t) => t
                .split(avail_width, avail_height)
                .map(|(a, b)| (Element::Table(a), Element::Table(b))),
            _ => None,
        }
    }

    pub fn draw(&self, canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
        match self {
            Element::Paragraph(p) => p.draw(canvas, x, top, avail_width),
            Element::Image(img) => img.draw(canvas, x, top, avail_width),
            Element::Table(t) => t.draw(canvas, x, top, avail_width),
            Element::Primitive(p) => p.draw(canvas, x, top, avail_width),
            Element::KeepTogether(children) => draw_flow(children, canvas, x, top, avail_width),
            Element::Spacer(_) | Element::PageBreak => {}
        }
    }
}

/// Height of elements stacked top to bottom; the first element's space
/// before is not counted. Page breaks take no room.
pub fn flow_height(elements: &[Element], avail_width: f32) -> f32 {
    let mut total = 0.0;
    for (i, e) in elements.iter().enumerate() {
        if i > 0 {
            total += e.space_before();
        }
        total += e.measure(avail_width).height + e.space_after();
    }
    total
}

/// Draw elements stacked top to bottom, matching [`flow_height`].
pub fn draw_flow(elements: &[Element], canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
    let mut y = top;
    for (i, e) in elements.iter().enumerate() {
        if i > 0 {
            y -= e.space_before();
        }
        e.draw(canvas, x, y, avail_width);
        y -= e.measure(avail_width).height + e.space_after();
    }
}
