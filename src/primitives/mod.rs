//! # Graphic Primitives
//!
//! Self-measuring drawings that sit in the story like any other element:
//! progress bars, timelines, info boxes, gradient boxes, KPI tiles and
//! dashboards, rules and ornaments.
//!
//! Each primitive reports its own size for an available width and paints
//! itself from a bottom-left origin, the way a canvas-level flowable does.
//! [`Primitive`] wraps them in one closed enum; adding a primitive is one
//! line in the `define_primitives!` list plus an [`Shape`] impl.

mod boxes;
mod rules;
mod track;

pub use boxes::{DashboardGrid, GradientBox, InfoBox, InfoKind, KpiSpec, KpiTile};
pub use rules::{Checkbox, HRule, Ornament};
pub use track::{ProgressBar, Timeline, TimelineEvent};

use crate::canvas::PageCanvas;
use crate::color::Color;
use crate::config::GradientDirection;
use crate::element::Size;

/// A drawing with intrinsic size.
pub trait Shape {
    /// Size when given `avail_width` of horizontal room.
    fn size(&self, avail_width: f32) -> Size;

    /// Paint with the bottom-left corner at `(x, y)`.
    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size);
}

macro_rules! define_primitives {
    ($($variant:ident($inner:ty)),+ $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Primitive {
            $($variant($inner),)+
        }

        $(
            impl From<$inner> for Primitive {
                fn from(p: $inner) -> Self {
                    Primitive::$variant(p)
                }
            }
        )+

        impl Primitive {
            pub fn size(&self, avail_width: f32) -> Size {
                match self { $(Primitive::$variant(p) => p.size(avail_width),)+ }
            }

            fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
                match self { $(Primitive::$variant(p) => p.paint(canvas, x, y, size),)+ }
            }

            pub fn name(&self) -> &'static str {
                match self { $(Primitive::$variant(_) => stringify!($variant),)+ }
            }
        }
    };
}

define_primitives! {
    ProgressBar(ProgressBar),
    Timeline(Timeline),
    InfoBox(InfoBox),
    GradientBox(GradientBox),
    KpiTile(KpiTile),
    Dashboard(DashboardGrid),
    HRule(HRule),
    Ornament(Ornament),
    Checkbox(Checkbox),
}

impl Primitive {
    /// Draw horizontally centered in `avail_width`, top edge at `top`.
    pub fn draw(&self, canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
        let size = self.size(avail_width);
        let dx = ((avail_width - size.width) / 2.0).max(0.0);
        self.paint(canvas, x + dx, top - size.height, size);
    }
}

/// Fill a rectangle with a two-color gradient approximated by 50 bands.
#[allow(clippy::too_many_arguments)]
pub fn paint_gradient(
    canvas: &mut PageCanvas,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    start: Color,
    end: Color,
    direction: GradientDirection,
) {
    const STEPS: usize = 50;
    for i in 0..STEPS {
        let ratio = i as f32 / STEPS as f32;
        let color = start.lerp(&end, ratio);
        match direction {
            GradientDirection::Horizontal => {
                let step = w / STEPS as f32;
                canvas.fill_rect(x + i as f32 * step, y, step, h, color);
            }
            GradientDirection::Vertical => {
                let step = h / STEPS as f32;
                canvas.fill_rect(x, y + i as f32 * step, w, step, color);
            }
        }
    }
}

/// Drop a trailing `.0` so whole numbers print without decimals.
pub(crate) fn format_number(v: f64) -> String {
    if v.fract().abs() < 1e-9 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Keep at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;

    #[test]
    fn test_gradient_band_count() {
        let mut canvas = PageCanvas::new(100.0, 100.0);
        paint_gradient(
            &mut canvas,
            0.0,
            0.0,
            100.0,
            50.0,
            Color::WHITE,
            Color::BLACK,
            GradientDirection::Vertical,
        );
        assert_eq!(canvas.ops().len(), 50);
        match &canvas.ops()[0] {
            DrawOp::Rect { fill, h, .. } => {
                assert_eq!(*fill, Some(Color::WHITE));
                assert_eq!(*h, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(75.0), "75");
        assert_eq!(format_number(62.5), "62.5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.239), "1.24");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_primitive_centered() {
        let p = Primitive::from(ProgressBar::new(50.0));
        let mut canvas = PageCanvas::new(612.0, 792.0);
        p.draw(&mut canvas, 72.0, 700.0, 468.0);
        match &canvas.ops()[0] {
            DrawOp::RoundRect { x, y, .. } => {
                assert_eq!(*x, 72.0 + 90.0);
                assert!((*y - (700.0 - 21.6)).abs() < 1e-3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(p.name(), "ProgressBar");
    }
}
