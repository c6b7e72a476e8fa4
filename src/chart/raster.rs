//! Pixel canvas and drawing helpers for chart rasterization.
//!
//! Charts are drawn into an RGB float buffer with anti-aliased shapes and
//! bitmap font labels, then encoded as PNG for embedding. Coordinates are
//! pixels with the origin at the top-left.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};

use crate::color::Color;
use crate::error::QuireError;

// ============================================================================
// CONSTANTS
// ============================================================================

const FONT_SM_W: usize = 6;
const FONT_SM_H: usize = 12;
const FONT_LG_W: usize = 12;
const FONT_LG_H: usize = 24;

const TOP_PAD: usize = 16;
const BOTTOM_PAD: usize = 8;
const X_LABEL_H: usize = FONT_LG_H + 8;
const Y_TICK_PAD: usize = 8;
const RIGHT_MARGIN: usize = 16;
const LEGEND_W: usize = 180;

pub(crate) const GRID_DASH_ON: usize = 6;
pub(crate) const GRID_DASH_OFF: usize = 6;

// ============================================================================
// CANVAS
// ============================================================================

/// RGB buffer, components in `0.0..=1.0`, initialized to white.
pub(crate) struct Canvas {
    buf: Vec<Color>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            buf: vec![Color::WHITE; width * height],
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Paint `color` over the pixel with `coverage` in `0.0..=1.0`.
    #[inline]
    pub(crate) fn blend(&mut self, x: usize, y: usize, color: Color, coverage: f32) {
        if self.in_bounds(x, y) {
            let idx = y * self.width + x;
            self.buf[idx] = self.buf[idx].lerp(&color, coverage);
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Color {
        self.buf[y * self.width + x]
    }

    pub(crate) fn to_png(&self) -> Result<Vec<u8>, QuireError> {
        let img = RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(self.buf[y as usize * self.width + x as usize].to_rgb8())
        });
        let mut png_bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
        Ok(png_bytes)
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

pub(crate) fn draw_hline(canvas: &mut Canvas, x1: usize, x2: usize, y: usize, thickness: usize, color: Color) {
    let half = thickness / 2;
    for dy in 0..thickness {
        let py = (y + dy).saturating_sub(half);
        for px in x1..=x2.min(canvas.width.saturating_sub(1)) {
            canvas.blend(px, py, color, 1.0);
        }
    }
}

pub(crate) fn draw_vline(canvas: &mut Canvas, x: usize, y1: usize, y2: usize, thickness: usize, color: Color) {
    let half = thickness / 2;
    for dx in 0..thickness {
        let px = (x + dx).saturating_sub(half);
        for py in y1..=y2.min(canvas.height.saturating_sub(1)) {
            canvas.blend(px, py, color, 1.0);
        }
    }
}

pub(crate) fn draw_hline_dashed(
    canvas: &mut Canvas,
    x1: usize,
    x2: usize,
    y: usize,
    thickness: usize,
    color: Color,
) {
    let period = GRID_DASH_ON + GRID_DASH_OFF;
    let half = thickness / 2;
    for px in x1..=x2.min(canvas.width.saturating_sub(1)) {
        if (px - x1) % period < GRID_DASH_ON {
            for dy in 0..thickness {
                canvas.blend(px, (y + dy).saturating_sub(half), color, 1.0);
            }
        }
    }
}

pub(crate) fn draw_vline_dashed(
    canvas: &mut Canvas,
    x: usize,
    y1: usize,
    y2: usize,
    thickness: usize,
    color: Color,
) {
    let period = GRID_DASH_ON + GRID_DASH_OFF;
    let half = thickness / 2;
    for py in y1..=y2.min(canvas.height.saturating_sub(1)) {
        if (py - y1) % period < GRID_DASH_ON {
            for dx in 0..thickness {
                canvas.blend((x + dx).saturating_sub(half), py, color, 1.0);
            }
        }
    }
}

pub(crate) fn draw_filled_rect(canvas: &mut Canvas, x1: usize, y1: usize, x2: usize, y2: usize, color: Color) {
    for y in y1..y2.min(canvas.height) {
        for x in x1..x2.min(canvas.width) {
            canvas.blend(x, y, color, 1.0);
        }
    }
}

pub(crate) fn draw_rect_outline(canvas: &mut Canvas, x1: usize, y1: usize, x2: usize, y2: usize, color: Color) {
    draw_hline(canvas, x1, x2, y1, 1, color);
    draw_hline(canvas, x1, x2, y2, 1, color);
    draw_vline(canvas, x1, y1, y2, 1, color);
    draw_vline(canvas, x2, y1, y2, 1, color);
}

pub(crate) fn draw_filled_circle(canvas: &mut Canvas, cx: f32, cy: f32, radius: f32, color: Color) {
    let r_ceil = radius.ceil() as i32 + 1;
    let cxi = cx as i32;
    let cyi = cy as i32;

    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let px = cxi + dx;
            let py = cyi + dy;
            if px < 0 || py < 0 {
                continue;
            }
            let dist = ((dx as f32 - (cx - cxi as f32)).powi(2) + (dy as f32 - (cy - cyi as f32)).powi(2)).sqrt();
            if dist <= radius {
                canvas.blend(px as usize, py as usize, color, 1.0);
            } else if dist <= radius + 1.0 {
                canvas.blend(px as usize, py as usize, color, 1.0 - (dist - radius));
            }
        }
    }
}

pub(crate) fn draw_line_thick(canvas: &mut Canvas, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: Color) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 0.001 {
        draw_filled_circle(canvas, x1, y1, thickness / 2.0, color);
        return;
    }

    let half_t = thickness / 2.0;
    let min_x = (x1.min(x2) - half_t - 1.0).max(0.0) as usize;
    let max_x = ((x1.max(x2) + half_t + 1.0).max(0.0) as usize).min(canvas.width.saturating_sub(1));
    let min_y = (y1.min(y2) - half_t - 1.0).max(0.0) as usize;
    let max_y = ((y1.max(y2) + half_t + 1.0).max(0.0) as usize).min(canvas.height.saturating_sub(1));

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let pxf = px as f32;
            let pyf = py as f32;

            // Project onto the segment
            let t = (((pxf - x1) * dx + (pyf - y1) * dy) / (len * len)).clamp(0.0, 1.0);
            let dist = ((pxf - (x1 + t * dx)).powi(2) + (pyf - (y1 + t * dy)).powi(2)).sqrt();

            if dist <= half_t {
                canvas.blend(px, py, color, 1.0);
            } else if dist <= half_t + 1.0 {
                canvas.blend(px, py, color, 1.0 - (dist - half_t));
            }
        }
    }
}

/// Thick line broken into dashes of `on` pixels separated by `off`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_line_dashed(
    canvas: &mut Canvas,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    thickness: f32,
    on: f32,
    off: f32,
    color: Color,
) {
    let len = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    if len < 0.001 || on <= 0.0 {
        return;
    }
    let (ux, uy) = ((x2 - x1) / len, (y2 - y1) / len);
    let mut d = 0.0;
    while d < len {
        let e = (d + on).min(len);
        draw_line_thick(canvas, x1 + ux * d, y1 + uy * d, x1 + ux * e, y1 + uy * e, thickness, color);
        d += on + off;
    }
}

/// Annular sector centered at `(cx, cy)`. Angles in degrees, counter-clockwise
/// from the positive x axis; `r_inner > 0` cuts a doughnut hole.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_wedge(
    canvas: &mut Canvas,
    cx: f32,
    cy: f32,
    r_inner: f32,
    r_outer: f32,
    start_deg: f32,
    sweep_deg: f32,
    color: Color,
) {
    if sweep_deg <= 0.0 {
        return;
    }
    let min_x = (cx - r_outer - 1.0).max(0.0) as usize;
    let max_x = ((cx + r_outer + 1.0).max(0.0) as usize).min(canvas.width.saturating_sub(1));
    let min_y = (cy - r_outer - 1.0).max(0.0) as usize;
    let max_y = ((cy + r_outer + 1.0).max(0.0) as usize).min(canvas.height.saturating_sub(1));

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f32 + 0.5 - cx;
            let dy = cy - (py as f32 + 0.5);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > r_outer + 1.0 || dist < r_inner {
                continue;
            }
            let angle = dy.atan2(dx).to_degrees();
            if sweep_deg < 360.0 && (angle - start_deg).rem_euclid(360.0) > sweep_deg {
                continue;
            }
            let coverage = if dist <= r_outer { 1.0 } else { 1.0 - (dist - r_outer) };
            canvas.blend(px, py, color, coverage);
        }
    }
}

// ============================================================================
// TEXT RENDERING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontSize {
    /// 6x12, for dense labels
    Small,
    /// 12x24, for axis labels and legends
    Large,
}

impl FontSize {
    pub(crate) fn char_width(self) -> usize {
        match self {
            FontSize::Small => FONT_SM_W,
            FontSize::Large => FONT_LG_W,
        }
    }

    pub(crate) fn char_height(self) -> usize {
        match self {
            FontSize::Small => FONT_SM_H,
            FontSize::Large => FONT_LG_H,
        }
    }

    fn font_data(self) -> &'static [u8] {
        match self {
            FontSize::Small => FONT_6X12,
            FontSize::Large => FONT_12X24,
        }
    }
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub(crate) fn draw_text(canvas: &mut Canvas, text: &str, x: usize, y: usize, color: Color, size: FontSize) {
    let Ok(mut font) = PSF2Font::new(size.font_data()) else {
        log::warn!("bitmap font unavailable, chart label '{}' dropped", text);
        return;
    };
    let char_w = size.char_width();
    let mut cursor_x = x;
    let mut utf8 = [0u8; 4];
    for ch in text.chars() {
        if let Some(glyph) = font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if on {
                        canvas.blend(cursor_x + col_x, y + row_y, color, 1.0);
                    }
                }
            }
        }
        cursor_x += char_w;
    }
}

pub(crate) fn text_width(text: &str, size: FontSize) -> usize {
    text.chars().count() * size.char_width()
}

pub(crate) fn draw_text_right(canvas: &mut Canvas, text: &str, right_x: usize, y: usize, color: Color, size: FontSize) {
    let x = right_x.saturating_sub(text_width(text, size));
    draw_text(canvas, text, x, y, color, size);
}

pub(crate) fn draw_text_centered(
    canvas: &mut Canvas,
    text: &str,
    center_x: usize,
    y: usize,
    color: Color,
    size: FontSize,
) {
    let x = center_x.saturating_sub(text_width(text, size) / 2);
    draw_text(canvas, text, x, y, color, size);
}

/// Shorten to `max_chars`, marking the cut with `.`.
pub(crate) fn fit_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars || max_chars == 0 {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    s.push('.');
    s
}

// ============================================================================
// NICE TICK GENERATION
// ============================================================================

fn nice_step(rough: f64) -> f64 {
    let exponent = rough.abs().log10().floor();
    let fraction = rough / 10.0f64.powf(exponent);
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10.0f64.powf(exponent)
}

pub(crate) fn compute_nice_ticks(min: f64, max: f64, target_count: usize) -> Vec<f64> {
    if (max - min).abs() < 1e-10 {
        return vec![min];
    }

    let step = nice_step((max - min) / target_count.max(1) as f64);
    let tick_min = (min / step).floor() * step;
    let tick_max = (max / step).ceil() * step;

    let mut ticks = Vec::new();
    let mut v = tick_min;
    while v <= tick_max + step * 0.01 {
        // Snap away float noise such as 0.30000000000000004
        ticks.push((v / step).round() * step);
        v += step;
    }
    ticks
}

/// Tick range covering `values`, always including zero when `from_zero`.
pub(crate) fn value_range(values: impl Iterator<Item = f64>, from_zero: bool) -> (f64, f64, Vec<f64>) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    if from_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if (hi - lo).abs() < 1e-10 {
        hi = lo + 1.0;
    }
    let ticks = compute_nice_ticks(lo, hi, 5);
    let first = ticks.first().copied().unwrap_or(lo);
    let last = ticks.last().copied().unwrap_or(hi);
    (first.min(lo), last.max(hi), ticks)
}

pub(crate) fn format_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Plot area inside the canvas, in pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    pub data_left: usize,
    pub data_right: usize,
    pub data_top: usize,
    pub data_bottom: usize,
}

impl Layout {
    pub(crate) fn data_width(&self) -> usize {
        self.data_right.saturating_sub(self.data_left)
    }

    pub(crate) fn data_height(&self) -> usize {
        self.data_bottom.saturating_sub(self.data_top)
    }

    /// Pixel row for `v` on a `lo..hi` axis.
    pub(crate) fn map_y(&self, v: f64, lo: f64, hi: f64) -> f32 {
        let t = if (hi - lo).abs() < 1e-10 { 0.5 } else { (v - lo) / (hi - lo) };
        self.data_bottom as f32 - t as f32 * self.data_height() as f32
    }

    /// Pixel column for `v` on a `lo..hi` axis.
    pub(crate) fn map_x(&self, v: f64, lo: f64, hi: f64) -> f32 {
        let t = if (hi - lo).abs() < 1e-10 { 0.5 } else { (v - lo) / (hi - lo) };
        self.data_left as f32 + t as f32 * self.data_width() as f32
    }
}

pub(crate) fn compute_layout(
    total_width: usize,
    total_height: usize,
    y_label_max_chars: usize,
    has_x_labels: bool,
    has_legend: bool,
) -> Layout {
    let left_gutter = y_label_max_chars * FONT_LG_W + Y_TICK_PAD * 2;
    let x_label_height = if has_x_labels { X_LABEL_H } else { 0 };
    let legend = if has_legend { LEGEND_W } else { 0 };

    Layout {
        data_left: left_gutter,
        data_right: total_width.saturating_sub(RIGHT_MARGIN + legend),
        data_top: TOP_PAD,
        data_bottom: total_height.saturating_sub(x_label_height + BOTTOM_PAD),
    }
}

/// Y axis with tick labels and horizontal grid lines.
pub(crate) fn draw_y_axis(canvas: &mut Canvas, layout: &Layout, ticks: &[f64], lo: f64, hi: f64, grid: bool) {
    let grid_color = Color::from_u32(0xDDDDDD);
    for &t in ticks {
        let y = layout.map_y(t, lo, hi).round() as usize;
        if grid {
            draw_hline_dashed(canvas, layout.data_left, layout.data_right, y, 1, grid_color);
        }
        let label = format_tick(t);
        let label_y = y.saturating_sub(FONT_LG_H / 2);
        draw_text_right(canvas, &label, layout.data_left - Y_TICK_PAD, label_y, Color::BLACK, FontSize::Large);
    }
    draw_vline(canvas, layout.data_left, layout.data_top, layout.data_bottom, 2, Color::BLACK);
    draw_hline(canvas, layout.data_left, layout.data_right, layout.data_bottom, 2, Color::BLACK);
}

/// Category labels centered under each slot, shrunk to fit the slot.
pub(crate) fn draw_x_labels(canvas: &mut Canvas, layout: &Layout, labels: &[String]) {
    if labels.is_empty() {
        return;
    }
    let slot = layout.data_width() / labels.len();
    let size = if labels.iter().any(|l| text_width(l, FontSize::Large) > slot) {
        FontSize::Small
    } else {
        FontSize::Large
    };
    let max_chars = (slot / size.char_width()).max(1);
    let y = layout.data_bottom + 6;
    for (i, label) in labels.iter().enumerate() {
        let cx = layout.data_left + slot * i + slot / 2;
        draw_text_centered(canvas, &fit_label(label, max_chars), cx, y, Color::BLACK, size);
    }
}

/// Color swatches with names, stacked in the right margin.
pub(crate) fn draw_legend(canvas: &mut Canvas, layout: &Layout, entries: &[(String, Color)]) {
    let x = layout.data_right + RIGHT_MARGIN;
    let max_chars = (LEGEND_W - 28) / FONT_SM_W;
    for (i, (name, color)) in entries.iter().enumerate() {
        let y = layout.data_top + i * (FONT_LG_H + 4);
        draw_filled_rect(canvas, x, y + 6, x + 16, y + 18, *color);
        draw_text(canvas, &fit_label(name, max_chars), x + 22, y + 6, Color::BLACK, FontSize::Small);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_ticks_positive_range() {
        let ticks = compute_nice_ticks(0.0, 100.0, 5);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_nice_ticks_small_range() {
        let ticks = compute_nice_ticks(0.0, 1.0, 5);
        assert_eq!(ticks[0], 0.0);
        assert!(*ticks.last().unwrap() >= 1.0 - 1e-9);
        assert!(ticks.len() >= 3);
    }

    #[test]
    fn test_nice_ticks_equal_values() {
        assert_eq!(compute_nice_ticks(5.0, 5.0, 5), vec![5.0]);
    }

    #[test]
    fn test_value_range_includes_zero() {
        let (lo, hi, ticks) = value_range([3.0, 7.0].into_iter(), true);
        assert_eq!(lo, 0.0);
        assert!(hi >= 7.0);
        assert!(ticks.len() >= 2);
        let (lo, hi, _) = value_range(std::iter::empty(), false);
        assert!(lo < hi);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(40.0), "40");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-2.5), "-2.5");
    }

    #[test]
    fn test_canvas_blend() {
        let mut c = Canvas::new(4, 4);
        c.blend(1, 1, Color::BLACK, 0.5);
        let p = c.pixel(1, 1);
        assert!((p.r - 0.5).abs() < 1e-6);
        c.blend(10, 10, Color::BLACK, 1.0);
        assert_eq!(c.pixel(0, 0), Color::WHITE);
    }

    #[test]
    fn test_wedge_covers_quarter() {
        let mut c = Canvas::new(40, 40);
        // Upper-right quadrant only
        draw_wedge(&mut c, 20.0, 20.0, 0.0, 15.0, 0.0, 90.0, Color::BLACK);
        assert_eq!(c.pixel(25, 15), Color::BLACK);
        assert_eq!(c.pixel(15, 25), Color::WHITE);
    }

    #[test]
    fn test_doughnut_hole() {
        let mut c = Canvas::new(40, 40);
        draw_wedge(&mut c, 20.0, 20.0, 8.0, 15.0, 0.0, 360.0, Color::BLACK);
        assert_eq!(c.pixel(20, 20), Color::WHITE);
        assert_eq!(c.pixel(20, 8), Color::BLACK);
    }

    #[test]
    fn test_text_marks_pixels() {
        let mut c = Canvas::new(60, 30);
        draw_text(&mut c, "88", 0, 0, Color::BLACK, FontSize::Large);
        let inked = (0..30).flat_map(|y| (0..60).map(move |x| (x, y))).any(|(x, y)| c.pixel(x, y) != Color::WHITE);
        assert!(inked);
    }

    #[test]
    fn test_png_encoding() {
        let mut c = Canvas::new(10, 5);
        draw_filled_rect(&mut c, 0, 0, 5, 5, Color::from_u32(0xFF0000));
        let png = c.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (10, 5));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(decoded.get_pixel(9, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_fit_label() {
        assert_eq!(fit_label("January", 4), "Jan.");
        assert_eq!(fit_label("Jan", 4), "Jan");
    }
}
