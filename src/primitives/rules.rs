//! Rules, ornaments and form checkboxes.

use super::Shape;
use crate::canvas::{DrawOp, PageCanvas, Stroke};
use crate::color::Color;
use crate::config::INCH;
use crate::element::Size;
use crate::text::Font;

/// Full-width horizontal rule.
#[derive(Debug, Clone, PartialEq)]
pub struct HRule {
    pub color: Color,
    pub thickness: f32,
    pub height: f32,
}

impl HRule {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            thickness: 1.0,
            height: 0.1 * INCH,
        }
    }
}

impl Shape for HRule {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(avail_width, self.height)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let mid = y + size.height / 2.0;
        canvas.line(x, mid, x + size.width, mid, Stroke::solid(self.color, self.thickness));
    }
}

/// Separator of two framed rules around a diamond.
#[derive(Debug, Clone, PartialEq)]
pub struct Ornament {
    pub color: Color,
    pub width: f32,
}

impl Ornament {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            width: 6.5 * INCH,
        }
    }
}

impl Shape for Ornament {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(self.width.min(avail_width), 36.0)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let side = size.width * 5.0 / 13.0;
        let stroke = Stroke::solid(self.color, 1.5);
        let (upper, lower) = (y + size.height, y);
        for left in [x, x + size.width - side] {
            canvas.line(left, upper, left + side, upper, stroke);
            canvas.line(left, lower, left + side, lower, stroke);
        }

        let (cx, cy) = (x + size.width / 2.0, y + size.height / 2.0);
        let r = 10.0;
        canvas.push(DrawOp::Polygon {
            points: vec![(cx, cy + r), (cx + r * 0.6, cy), (cx, cy - r), (cx - r * 0.6, cy)],
            fill: Some(self.color),
            stroke: None,
        });
    }
}

/// A label followed by an empty tick box.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkbox {
    pub label: String,
    pub size: f32,
    pub color: Color,
}

impl Checkbox {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            size: 11.0,
            color: Color::BLACK,
        }
    }

    fn label_text(&self) -> String {
        format!("{}: ", self.label)
    }
}

impl Shape for Checkbox {
    fn size(&self, avail_width: f32) -> Size {
        let text_w = Font::Helvetica.text_width(&self.label_text(), self.size);
        Size::new(avail_width.max(text_w + self.size), self.size * 16.0 / 11.0)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let baseline = y + (size.height - self.size) / 2.0 + self.size * Font::Helvetica.descent();
        let label = self.label_text();
        canvas.text(x, baseline, Font::Helvetica, self.size, self.color, label.as_str());
        let bx = x + Font::Helvetica.text_width(&label, self.size);
        let side = self.size * 0.8;
        canvas.stroke_rect(bx, baseline, side, side, Stroke::solid(self.color, 0.8));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hrule_spans_width() {
        let rule = HRule::new(Color::BLACK);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        let size = rule.size(468.0);
        rule.paint(&mut canvas, 72.0, 100.0, size);
        match &canvas.ops()[0] {
            DrawOp::Line { x1, y1, x2, y2, .. } => {
                assert_eq!((*x1, *x2), (72.0, 540.0));
                assert!((y1 - 103.6).abs() < 1e-3 && y1 == y2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ornament_has_diamond_and_four_rules() {
        let o = Ornament::new(Color::from_u32(0xCCB366));
        let mut canvas = PageCanvas::new(612.0, 792.0);
        o.paint(&mut canvas, 0.0, 0.0, o.size(468.0));
        let lines = canvas.ops().iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
        let polys = canvas.ops().iter().filter(|op| matches!(op, DrawOp::Polygon { .. })).count();
        assert_eq!((lines, polys), (4, 1));
    }

    #[test]
    fn test_checkbox_draws_label_and_box() {
        let c = Checkbox::new("Agree");
        let mut canvas = PageCanvas::new(612.0, 792.0);
        c.paint(&mut canvas, 0.0, 0.0, c.size(468.0));
        assert!(matches!(&canvas.ops()[0], DrawOp::Text { text, .. } if text == "Agree: "));
        assert!(matches!(canvas.ops()[1], DrawOp::Rect { fill: None, .. }));
    }
}
