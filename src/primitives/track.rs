//! Progress bars and timelines.

use serde::{Deserialize, Serialize};

use super::{Shape, format_number, truncate_chars};
use crate::canvas::{DrawOp, PageCanvas, Stroke};
use crate::color::Color;
use crate::config::{HAlign, INCH};
use crate::element::Size;
use crate::text::Font;

// ============================================================================
// PROGRESS BAR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    /// Clamped to 0..=100.
    pub percentage: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub track: Color,
    pub show_text: bool,
    /// `{percentage}` is replaced by the value.
    pub text_format: String,
}

impl ProgressBar {
    pub fn new(percentage: f32) -> Self {
        Self {
            percentage: percentage.clamp(0.0, 100.0),
            width: 4.0 * INCH,
            height: 0.3 * INCH,
            color: Color::from_u32(0x008000),
            track: Color::from_u32(0xD3D3D3),
            show_text: true,
            text_format: "{percentage}%".to_string(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn label(&self) -> String {
        self.text_format
            .replace("{percentage}", &format_number(self.percentage as f64))
    }
}

impl Shape for ProgressBar {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(self.width.min(avail_width), self.height)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let grey = Color::from_u32(0x808080);
        canvas.push(DrawOp::RoundRect {
            x,
            y,
            w: size.width,
            h: size.height,
            radius: 5.0,
            fill: Some(self.track),
            stroke: Some(Stroke::solid(grey, 1.0)),
        });

        let fill_w = (size.width - 4.0) * self.percentage / 100.0;
        if fill_w > 0.0 {
            canvas.push(DrawOp::RoundRect {
                x: x + 2.0,
                y: y + 2.0,
                w: fill_w,
                h: size.height - 4.0,
                radius: 3.0,
                fill: Some(self.color),
                stroke: None,
            });
        }

        if self.show_text {
            let label = self.label();
            canvas.text_aligned(
                x + size.width / 2.0,
                y + (size.height - 8.0) / 2.0,
                HAlign::Center,
                Font::HelveticaBold,
                8.0,
                Color::BLACK,
                &label,
            );
        }
    }
}

// ============================================================================
// TIMELINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    pub width: f32,
    pub line_color: Color,
    pub dot_color: Color,
}

const EVENT_PITCH: f32 = 0.8 * INCH;

impl Timeline {
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        Self {
            events,
            width: 6.0 * INCH,
            line_color: Color::from_u32(0x808080),
            dot_color: Color::from_u32(0x0000FF),
        }
    }
}

impl Shape for Timeline {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(
            self.width.min(avail_width),
            self.events.len() as f32 * EVENT_PITCH + 0.5 * INCH,
        )
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let line_x = x + INCH;
        canvas.line(
            line_x,
            y + 0.25 * INCH,
            line_x,
            y + size.height - 0.25 * INCH,
            Stroke::solid(self.line_color, 3.0),
        );

        let mut event_y = y + size.height - 0.5 * INCH;
        for event in &self.events {
            canvas.push(DrawOp::Circle {
                cx: line_x,
                cy: event_y,
                r: 5.0,
                fill: Some(self.dot_color),
                stroke: None,
            });
            let tx = line_x + 20.0;
            canvas.text(tx, event_y + 5.0, Font::HelveticaBold, 10.0, Color::BLACK, event.date.as_str());
            canvas.text(tx, event_y - 10.0, Font::HelveticaBold, 12.0, Color::BLACK, event.title.as_str());
            canvas.text(
                tx,
                event_y - 25.0,
                Font::Helvetica,
                9.0,
                Color::BLACK,
                truncate_chars(&event.description, 80),
            );
            event_y -= EVENT_PITCH;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_clamped() {
        assert_eq!(ProgressBar::new(140.0).percentage, 100.0);
        assert_eq!(ProgressBar::new(-5.0).percentage, 0.0);
        assert_eq!(ProgressBar::new(42.0).label(), "42%");
    }

    #[test]
    fn test_empty_bar_has_no_fill() {
        let bar = ProgressBar::new(0.0);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        let size = bar.size(500.0);
        bar.paint(&mut canvas, 0.0, 0.0, size);
        let rounds = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::RoundRect { .. }))
            .count();
        assert_eq!(rounds, 1);
    }

    #[test]
    fn test_timeline_height_per_event() {
        let events = vec![TimelineEvent::default(); 3];
        let t = Timeline::new(events);
        let size = t.size(1000.0);
        assert!((size.height - (3.0 * 57.6 + 36.0)).abs() < 1e-3);
        assert_eq!(size.width, 432.0);
    }

    #[test]
    fn test_timeline_truncates_description() {
        let t = Timeline::new(vec![TimelineEvent {
            date: "2024".into(),
            title: "Launch".into(),
            description: "x".repeat(200),
        }]);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        let size = t.size(500.0);
        t.paint(&mut canvas, 0.0, 0.0, size);
        let longest = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.len()),
                _ => None,
            })
            .max();
        assert_eq!(longest, Some(80));
    }
}
