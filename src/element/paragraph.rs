use crate::canvas::{DrawOp, PageCanvas, Stroke};
use crate::config::HAlign;
use crate::style::TextStyle;
use crate::text::{Line, Span, markup, wrap_spans};

/// What a paragraph is for; break policies look at this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Body,
    Title,
    Heading(u8),
    Caption,
}

/// Wrapped, styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub spans: Vec<Span>,
    pub style: TextStyle,
    pub role: Role,
    /// Justify the final line too (set on the head of a split paragraph).
    justify_last: bool,
}

impl Paragraph {
    /// Paragraph from inline markup (`**bold**`, `*italic*`, links, ...).
    pub fn new(text: &str, style: &TextStyle) -> Self {
        Self::from_spans(markup::parse_inline(text, &style.base_span()), style)
    }

    /// Paragraph with no markup interpretation.
    pub fn plain(text: &str, style: &TextStyle) -> Self {
        Self::from_spans(markup::plain(text, &style.base_span()), style)
    }

    pub fn from_spans(spans: Vec<Span>, style: &TextStyle) -> Self {
        Self {
            spans,
            style: style.clone(),
            role: Role::Body,
            justify_last: false,
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn padding(&self) -> f32 {
        self.style.frame.map(|f| f.padding).unwrap_or(0.0)
    }

    fn text_width(&self, avail_width: f32) -> f32 {
        (avail_width - self.style.left_indent - self.style.right_indent - 2.0 * self.padding()).max(1.0)
    }

    pub fn lines(&self, avail_width: f32) -> Vec<Line> {
        wrap_spans(&self.spans, self.text_width(avail_width))
    }

    fn line_height(&self, line: &Line) -> f32 {
        let size = line.max_size().unwrap_or(self.style.size);
        self.style.leading.max(size * 1.2)
    }

    pub fn height(&self, avail_width: f32) -> f32 {
        let lines = self.lines(avail_width);
        if lines.is_empty() {
            return 0.0;
        }
        lines.iter().map(|l| self.line_height(l)).sum::<f32>() + 2.0 * self.padding()
    }

    /// Split so the head fits in `avail_height`. `None` when not even one
    /// line fits or the whole paragraph already fits.
    pub fn split(&self, avail_width: f32, avail_height: f32) -> Option<(Paragraph, Paragraph)> {
        let lines = self.lines(avail_width);
        let pad = self.padding();
        let mut used = 2.0 * pad;
        let mut fit = 0;
        for line in &lines {
            let h = self.line_height(line);
            if used + h > avail_height {
                break;
            }
            used += h;
            fit += 1;
        }
        if fit == 0 || fit >= lines.len() {
            return None;
        }

        let head_last_soft = !lines[fit - 1].ends_paragraph;
        let mut head = Paragraph {
            spans: join_lines(&lines[..fit]),
            style: self.style.clone(),
            role: self.role,
            justify_last: head_last_soft,
        };
        head.style.space_after = 0.0;
        let mut tail = Paragraph {
            spans: join_lines(&lines[fit..]),
            style: self.style.clone(),
            role: self.role,
            justify_last: self.justify_last,
        };
        tail.style.space_before = 0.0;
        Some((head, tail))
    }

    pub fn draw(&self, canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
        let lines = self.lines(avail_width);
        if lines.is_empty() {
            return;
        }
        let pad = self.padding();
        let box_x = x + self.style.left_indent;
        let box_w = avail_width - self.style.left_indent - self.style.right_indent;
        let total_h = self.height(avail_width);

        if let Some(frame) = self.style.frame {
            canvas.push(DrawOp::Rect {
                x: box_x,
                y: top - total_h,
                w: box_w,
                h: total_h,
                fill: frame.background,
                stroke: frame.border.map(|(color, width)| Stroke::solid(color, width)),
            });
        }

        let text_x = box_x + pad;
        let text_w = self.text_width(avail_width);
        let mut line_top = top - pad;
        let count = lines.len();
        for (i, line) in lines.iter().enumerate() {
            let lh = self.line_height(line);
            let size = line.max_size().unwrap_or(self.style.size);
            let font = line.runs.first().map(|r| r.font).unwrap_or(self.style.font);
            let glyph_h = size * (font.ascent() + font.descent());
            let baseline = line_top - (lh - glyph_h) / 2.0 - size * font.ascent();

            let ends = if i + 1 == count {
                !self.justify_last
            } else {
                line.ends_paragraph
            };
            let justify = self.style.align == HAlign::Justify && line.spaces > 0 && !ends;
            let (offset, extra) = match self.style.align {
                HAlign::Center => ((text_w - line.width) / 2.0, 0.0),
                HAlign::Right => (text_w - line.width, 0.0),
                _ if justify => (0.0, (text_w - line.width).max(0.0) / line.spaces as f32),
                _ => (0.0, 0.0),
            };
            draw_line(canvas, line, text_x + offset, baseline, extra);
            line_top -= lh;
        }
    }
}

/// Rebuild spans from laid-out lines so re-wrapping at the same width
/// reproduces them.
fn join_lines(lines: &[Line]) -> Vec<Span> {
    let mut spans = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            let sep = if lines[i - 1].ends_paragraph { "\n" } else { " " };
            let base = line
                .runs
                .first()
                .or_else(|| lines[i - 1].runs.last())
                .cloned();
            if let Some(base) = base {
                spans.push(base.with_text(sep));
            }
        }
        spans.extend(line.runs.iter().cloned());
    }
    spans
}

fn draw_line(canvas: &mut PageCanvas, line: &Line, x: f32, baseline: f32, word_extra: f32) {
    let mut cursor = x;
    for run in &line.runs {
        let start = cursor;
        let y = baseline + run.rise;
        let spaces = run.text.matches(' ').count() as f32;
        let w = run.width() + word_extra * spaces;

        if let Some(bg) = run.background {
            canvas.push(DrawOp::Rect {
                x: start,
                y: y - run.size * run.font.descent(),
                w,
                h: run.size * (run.font.ascent() + run.font.descent()),
                fill: Some(bg),
                stroke: None,
            });
        }

        if word_extra > 0.0 && spaces > 0.0 {
            let mut parts = run.text.split(' ').peekable();
            while let Some(part) = parts.next() {
                canvas.text(cursor, y, run.font, run.size, run.color, part);
                cursor += run.font.text_width(part, run.size);
                if parts.peek().is_some() {
                    cursor += run.font.text_width(" ", run.size) + word_extra;
                }
            }
        } else {
            canvas.text(cursor, y, run.font, run.size, run.color, run.text.as_str());
            cursor += w;
        }

        if run.underline {
            let uy = y - run.size * 0.12;
            canvas.line(start, uy, start + w, uy, Stroke::solid(run.color, (run.size * 0.05).max(0.5)));
        }
        if let Some(url) = &run.link {
            canvas.push(DrawOp::Link {
                x: start,
                y: y - run.size * run.font.descent(),
                w,
                h: run.size,
                url: url.clone(),
            });
        }
    }
}
