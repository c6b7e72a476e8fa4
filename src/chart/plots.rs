//! Plot renderers: one function per chart kind, each turning a JSON data
//! record into PNG bytes.
//!
//! Data records follow one vocabulary across kinds: `labels`/`x` for
//! categories, `values`/`y` for numbers, `colors` for per-item colors, and a
//! few kind-specific switches (`show_values`, `explode`, `bins`,
//! `show_stats`, `trend_line`).

use serde_json::Value;

use super::ChartKind;
use super::classify::mean;
use super::raster::{
    Canvas, FontSize, Layout, compute_layout, compute_nice_ticks, draw_filled_circle, draw_filled_rect, draw_hline, draw_legend,
    draw_line_dashed, draw_line_thick, draw_rect_outline, draw_text, draw_text_centered, draw_text_right,
    draw_vline, draw_vline_dashed, draw_wedge, draw_x_labels, draw_y_axis, fit_label, format_tick, text_width, value_range,
};
use crate::color::Color;
use crate::error::QuireError;
use crate::primitives::format_number;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Pixel size of a rendered chart: twice the 500x300pt it is shown at.
pub const WIDTH: usize = 1000;
pub const HEIGHT: usize = 600;

const SERIES_COLORS: [u32; 5] = [0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD];
const PIE_COLORS: [u32; 5] = [0xFF9999, 0x66B3FF, 0x99FF99, 0xFFCC99, 0xFF99CC];

const LINE_THICKNESS: f32 = 4.0;
const MARKER_RADIUS: f32 = 6.0;
const BAR_FILL: f32 = 0.8;
const TREND_RED: Color = Color::rgb(1.0, 0.0, 0.0);

/// Rasterize `data` as a chart of `kind`.
pub fn render(kind: ChartKind, data: &Value) -> Result<Vec<u8>, QuireError> {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    match kind {
        ChartKind::Bar => bar(&mut canvas, data)?,
        ChartKind::Hbar => hbar(&mut canvas, data)?,
        ChartKind::Pie => pie(&mut canvas, data, 0.0)?,
        ChartKind::Doughnut => pie(&mut canvas, data, 0.5)?,
        ChartKind::Line => line(&mut canvas, data)?,
        ChartKind::Histogram => histogram(&mut canvas, data)?,
        ChartKind::Scatter => scatter(&mut canvas, data)?,
        ChartKind::Auto | ChartKind::Table => {
            return Err(QuireError::Chart(format!("'{}' is not a plot kind", kind)));
        }
    }
    canvas.to_png()
}

// ============================================================================
// DATA EXTRACTION
// ============================================================================

fn field<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| data.get(*k).filter(|v| !v.is_null()))
}

fn numbers_at(data: &Value, keys: &[&str]) -> Result<Vec<f64>, QuireError> {
    let list = field(data, keys).ok_or_else(|| QuireError::Chart(format!("missing '{}' list", keys[0])))?;
    numbers_of(list, keys[0])
}

/// A non-empty list of numbers.
fn numbers_of(list: &Value, name: &str) -> Result<Vec<f64>, QuireError> {
    let items = list
        .as_array()
        .ok_or_else(|| QuireError::Chart(format!("'{}' must be a list", name)))?;
    let values: Vec<f64> = items
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| QuireError::Chart(format!("'{}' must hold numbers, found {}", name, v)))
        })
        .collect::<Result<_, _>>()?;
    if values.is_empty() {
        return Err(QuireError::Chart(format!("'{}' is empty", name)));
    }
    Ok(values)
}

pub(crate) fn label_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn labels_at(data: &Value, keys: &[&str]) -> Vec<String> {
    field(data, keys)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(label_text).collect())
        .unwrap_or_default()
}

/// Labels for `n` items; missing ones are numbered from 1.
fn labels_for(data: &Value, keys: &[&str], n: usize) -> Result<Vec<String>, QuireError> {
    let labels = labels_at(data, keys);
    if labels.is_empty() {
        return Ok((1..=n).map(|i| i.to_string()).collect());
    }
    if labels.len() != n {
        return Err(QuireError::Chart(format!(
            "{} labels for {} values",
            labels.len(),
            n
        )));
    }
    Ok(labels)
}

/// The `colors` list (or a single `color`), else `defaults`; cycled to `n`.
fn colors_for(data: &Value, defaults: &[u32], n: usize) -> Vec<Color> {
    let parse = |v: &Value| {
        let parsed = v.as_str().and_then(|s| s.parse::<Color>().ok());
        if parsed.is_none() {
            log::warn!("ignoring invalid chart color {}", v);
        }
        parsed
    };
    let mut palette: Vec<Color> = match data.get("colors") {
        Some(Value::Array(items)) => items.iter().filter_map(parse).collect(),
        Some(single @ Value::String(_)) => parse(single).into_iter().collect(),
        _ => Vec::new(),
    };
    if palette.is_empty() {
        palette.extend(data.get("color").and_then(parse));
    }
    if palette.is_empty() {
        palette = defaults.iter().map(|&c| Color::from_u32(c)).collect();
    }
    (0..n).map(|i| palette[i % palette.len()]).collect()
}

fn flag(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn max_label_chars(ticks: &[f64]) -> usize {
    ticks.iter().map(|&t| format_tick(t).chars().count()).max().unwrap_or(1)
}

/// Numeric x axis: tick labels under the plot area.
fn draw_x_ticks(canvas: &mut Canvas, layout: &Layout, ticks: &[f64], lo: f64, hi: f64) {
    for &t in ticks {
        let x = layout.map_x(t, lo, hi).round() as usize;
        draw_text_centered(canvas, &format_tick(t), x, layout.data_bottom + 6, Color::BLACK, FontSize::Large);
    }
}

// ============================================================================
// BAR CHARTS
// ============================================================================

fn bar(canvas: &mut Canvas, data: &Value) -> Result<(), QuireError> {
    let values = numbers_at(data, &["values", "y"])?;
    let labels = labels_for(data, &["labels", "x"], values.len())?;
    let colors = colors_for(data, &SERIES_COLORS, values.len());

    let (lo, hi, ticks) = value_range(values.iter().copied(), true);
    let layout = compute_layout(canvas.width(), canvas.height(), max_label_chars(&ticks), true, false);
    draw_y_axis(canvas, &layout, &ticks, lo, hi, false);

    let slot = layout.data_width() as f32 / values.len() as f32;
    let zero_y = layout.map_y(0.0, lo, hi);
    for (i, (&v, &color)) in values.iter().zip(&colors).enumerate() {
        let cx = layout.data_left as f32 + slot * (i as f32 + 0.5);
        let half = slot * BAR_FILL / 2.0;
        let vy = layout.map_y(v, lo, hi);
        let (top, bottom) = (vy.min(zero_y), vy.max(zero_y));
        draw_filled_rect(
            canvas,
            (cx - half).round() as usize,
            top.round() as usize,
            (cx + half).round() as usize,
            bottom.round() as usize,
            color,
        );
        if flag(data, "show_values") {
            let label_y = (top as usize).saturating_sub(FontSize::Large.char_height() + 4);
            draw_text_centered(canvas, &format_number(v), cx as usize, label_y, Color::BLACK, FontSize::Large);
        }
    }
    draw_x_labels(canvas, &layout, &labels);
    Ok(())
}

fn hbar(canvas: &mut Canvas, data: &Value) -> Result<(), QuireError> {
    let values = numbers_at(data, &["values", "x"])?;
    let labels = labels_for(data, &["labels", "y"], values.len())?;
    let colors = colors_for(data, &SERIES_COLORS, values.len());

    let (lo, hi, ticks) = value_range(values.iter().copied(), true);
    let label_chars = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1).min(16);
    let layout = compute_layout(canvas.width(), canvas.height(), label_chars, true, false);
    let value_room = if flag(data, "show_values") {
        values.iter().map(|&v| text_width(&format_number(v), FontSize::Large)).max().unwrap_or(0) + 8
    } else {
        0
    };
    let layout = Layout {
        data_right: layout.data_right.saturating_sub(value_room),
        ..layout
    };

    let slot = layout.data_height() as f32 / values.len() as f32;
    let zero_x = layout.map_x(0.0, lo, hi);
    for (i, ((&v, &color), label)) in values.iter().zip(&colors).zip(&labels).enumerate() {
        // First item at the bottom
        let cy = layout.data_bottom as f32 - slot * (i as f32 + 0.5);
        let half = slot * BAR_FILL / 2.0;
        let vx = layout.map_x(v, lo, hi);
        let (left, right) = (vx.min(zero_x), vx.max(zero_x));
        draw_filled_rect(
            canvas,
            left.round() as usize,
            (cy - half).round() as usize,
            right.round() as usize,
            (cy + half).round() as usize,
            color,
        );
        let text_y = (cy as usize).saturating_sub(FontSize::Large.char_height() / 2);
        draw_text_right(canvas, &fit_label(label, label_chars), layout.data_left - 8, text_y, Color::BLACK, FontSize::Large);
        if flag(data, "show_values") {
            draw_text(canvas, &format_number(v), right as usize + 6, text_y, Color::BLACK, FontSize::Large);
        }
    }

    draw_vline(canvas, layout.data_left, layout.data_top, layout.data_bottom, 2, Color::BLACK);
    draw_hline(canvas, layout.data_left, layout.data_right, layout.data_bottom, 2, Color::BLACK);
    draw_x_ticks(canvas, &layout, &ticks, lo, hi);
    Ok(())
}

// ============================================================================
// PIE CHARTS
// ============================================================================

/// Pie with wedges laid counter-clockwise from `start_angle` (90 by
/// default). `hole` is the inner radius as a fraction of the outer one.
fn pie(canvas: &mut Canvas, data: &Value, hole: f32) -> Result<(), QuireError> {
    let values = numbers_at(data, &["values", "y"])?;
    if values.iter().any(|&v| v < 0.0) {
        return Err(QuireError::Chart("pie values must not be negative".into()));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(QuireError::Chart("pie values sum to zero".into()));
    }
    let labels = labels_at(data, &["labels", "x"]);
    let colors = colors_for(data, &PIE_COLORS, values.len());
    let explode: Vec<f32> = field(data, &["explode"])
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| v.as_f64().unwrap_or(0.0) as f32).collect())
        .unwrap_or_default();
    let start = data.get("start_angle").and_then(Value::as_f64).unwrap_or(90.0) as f32;

    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let radius = h.min(w) * 0.36;
    let (cx, cy) = (w / 2.0, h / 2.0);

    let mut angle = start;
    for (i, &v) in values.iter().enumerate() {
        let sweep = (v / total) as f32 * 360.0;
        let mid = (angle + sweep / 2.0).to_radians();
        let offset = explode.get(i).copied().unwrap_or(0.0) * radius;
        let (wx, wy) = (cx + offset * mid.cos(), cy - offset * mid.sin());
        draw_wedge(canvas, wx, wy, radius * hole, radius, angle, sweep, colors[i]);

        if sweep > 0.0 {
            let pct = format!("{:.1}%", v / total * 100.0);
            let r_pct = if hole > 0.0 { radius * (1.0 + hole) / 2.0 } else { radius * 0.6 };
            let px = wx + r_pct * mid.cos();
            let py = wy - r_pct * mid.sin();
            let ty = (py as usize).saturating_sub(FontSize::Large.char_height() / 2);
            draw_text_centered(canvas, &pct, px as usize, ty, Color::WHITE, FontSize::Large);

            if let Some(label) = labels.get(i) {
                let lx = wx + radius * 1.12 * mid.cos();
                let ly = wy - radius * 1.12 * mid.sin();
                let ty = (ly as usize).saturating_sub(FontSize::Large.char_height() / 2);
                if mid.cos() >= 0.0 {
                    draw_text(canvas, label, lx as usize, ty, Color::BLACK, FontSize::Large);
                } else {
                    draw_text_right(canvas, label, lx as usize, ty, Color::BLACK, FontSize::Large);
                }
            }
        }
        angle += sweep;
    }
    Ok(())
}

// ============================================================================
// LINE CHARTS
// ============================================================================

fn line(canvas: &mut Canvas, data: &Value) -> Result<(), QuireError> {
    let y = field(data, &["y", "values"]).ok_or_else(|| QuireError::Chart("missing 'y' list".into()))?;
    let multi = y.as_array().and_then(|a| a.first()).is_some_and(Value::is_array);

    let series: Vec<Vec<f64>> = if multi {
        let rows = y.as_array().map(Vec::as_slice).unwrap_or_default();
        rows.iter().map(|row| numbers_of(row, "y")).collect::<Result<_, _>>()?
    } else {
        vec![numbers_at(data, &["y", "values"])?]
    };
    let n = series.iter().map(Vec::len).max().unwrap_or(0);
    let labels = labels_at(data, &["x", "labels"]);
    if !labels.is_empty() && series.iter().any(|s| s.len() != labels.len()) {
        return Err(QuireError::Chart(format!("x has {} entries but a series does not", labels.len())));
    }

    let defaults: &[u32] = if multi { &SERIES_COLORS[..4] } else { &SERIES_COLORS[..1] };
    let colors = colors_for(data, defaults, series.len());
    let names: Vec<String> = {
        let given = labels_at(data, &["line_labels"]);
        (0..series.len())
            .map(|i| given.get(i).cloned().unwrap_or_else(|| format!("Line {}", i + 1)))
            .collect()
    };

    let (lo, hi, ticks) = value_range(series.iter().flatten().copied(), false);
    let layout = compute_layout(canvas.width(), canvas.height(), max_label_chars(&ticks), true, multi);
    draw_y_axis(canvas, &layout, &ticks, lo, hi, true);

    let x_at = |i: usize| {
        if n <= 1 {
            layout.data_left as f32 + layout.data_width() as f32 / 2.0
        } else {
            layout.data_left as f32 + 16.0 + i as f32 / (n - 1) as f32 * (layout.data_width() as f32 - 32.0)
        }
    };
    let radius = if multi { MARKER_RADIUS * 0.7 } else { MARKER_RADIUS };
    for (values, &color) in series.iter().zip(&colors) {
        let points: Vec<(f32, f32)> = values.iter().enumerate().map(|(i, &v)| (x_at(i), layout.map_y(v, lo, hi))).collect();
        for pair in points.windows(2) {
            draw_line_thick(canvas, pair[0].0, pair[0].1, pair[1].0, pair[1].1, LINE_THICKNESS, color);
        }
        for &(px, py) in &points {
            draw_filled_circle(canvas, px, py, radius, color);
        }
    }

    // Thin labels so neighbors never overlap
    let x_labels: Vec<String> = if labels.is_empty() { (1..=n).map(|i| i.to_string()).collect() } else { labels };
    let widest = x_labels.iter().map(|l| text_width(l, FontSize::Small)).max().unwrap_or(0) + 8;
    let spacing = if n > 1 { (layout.data_width() as f32 - 32.0) / (n - 1) as f32 } else { f32::MAX };
    let every = ((widest as f32 / spacing).ceil() as usize).max(1);
    for (i, label) in x_labels.iter().enumerate().step_by(every) {
        draw_text_centered(canvas, label, x_at(i) as usize, layout.data_bottom + 6, Color::BLACK, FontSize::Small);
    }

    if multi {
        let entries: Vec<(String, Color)> = names.into_iter().zip(colors).collect();
        draw_legend(canvas, &layout, &entries);
    }
    Ok(())
}

// ============================================================================
// HISTOGRAM
// ============================================================================

fn histogram(canvas: &mut Canvas, data: &Value) -> Result<(), QuireError> {
    let values = numbers_at(data, &["values", "y"])?;
    let bins = data.get("bins").and_then(Value::as_u64).unwrap_or(15).clamp(1, 200) as usize;
    let color = colors_for(data, &SERIES_COLORS[..1], 1)[0];
    let alpha = data.get("alpha").and_then(Value::as_f64).unwrap_or(0.7).clamp(0.0, 1.0) as f32;

    let counts = bin_counts(&values, bins);
    let (vmin, vmax) = min_max(&values);
    let (vmin, vmax) = if (vmax - vmin).abs() < 1e-12 { (vmin - 0.5, vmax + 0.5) } else { (vmin, vmax) };

    let (lo, hi, ticks) = value_range(counts.iter().map(|&c| c as f64), true);
    let show_stats = flag(data, "show_stats");
    let layout = compute_layout(canvas.width(), canvas.height(), max_label_chars(&ticks), true, show_stats);
    draw_y_axis(canvas, &layout, &ticks, lo, hi, true);

    let fill = Color::WHITE.lerp(&color, alpha);
    for (i, &count) in counts.iter().enumerate() {
        let x0 = layout.map_x(vmin + (vmax - vmin) * i as f64 / bins as f64, vmin, vmax).round() as usize;
        let x1 = layout.map_x(vmin + (vmax - vmin) * (i + 1) as f64 / bins as f64, vmin, vmax).round() as usize;
        let top = layout.map_y(count as f64, lo, hi).round() as usize;
        if count > 0 {
            draw_filled_rect(canvas, x0, top, x1, layout.data_bottom, fill);
            draw_rect_outline(canvas, x0, top, x1, layout.data_bottom, Color::BLACK);
        }
    }

    let x_ticks: Vec<f64> = compute_nice_ticks(vmin, vmax, 5)
        .into_iter()
        .filter(|t| *t >= vmin - 1e-9 && *t <= vmax + 1e-9)
        .collect();
    draw_x_ticks(canvas, &layout, &x_ticks, vmin, vmax);

    if show_stats {
        let m = mean(&values);
        let x = layout.map_x(m, vmin, vmax).round() as usize;
        draw_vline_dashed(canvas, x, layout.data_top, layout.data_bottom, 4, TREND_RED);
        draw_legend(canvas, &layout, &[(format!("Mean: {:.1}", m), TREND_RED)]);
    }
    Ok(())
}

/// Equal-width bin counts over the data range; the last bin is closed.
pub(crate) fn bin_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins.max(1)];
    let (lo, hi) = min_max(values);
    let span = hi - lo;
    for &v in values {
        let idx = if span.abs() < 1e-12 {
            bins / 2
        } else {
            (((v - lo) / span) * bins as f64).floor() as usize
        };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

// ============================================================================
// SCATTER
// ============================================================================

fn scatter(canvas: &mut Canvas, data: &Value) -> Result<(), QuireError> {
    let xs = numbers_at(data, &["x"])?;
    let ys = numbers_at(data, &["y"])?;
    if xs.len() != ys.len() {
        return Err(QuireError::Chart(format!("{} x values for {} y values", xs.len(), ys.len())));
    }
    let colors = colors_for(data, &SERIES_COLORS[..1], xs.len());
    let sizes: Vec<f64> = field(data, &["sizes"])
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default();

    let (ylo, yhi, yticks) = value_range(ys.iter().copied(), false);
    let (xlo, xhi, xticks) = value_range(xs.iter().copied(), false);
    let layout = compute_layout(canvas.width(), canvas.height(), max_label_chars(&yticks), true, false);
    draw_y_axis(canvas, &layout, &yticks, ylo, yhi, true);
    draw_x_ticks(canvas, &layout, &xticks, xlo, xhi);

    for (i, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
        // Marker sizes are areas in square points, as plotting libraries take them
        let area = sizes.get(i).copied().unwrap_or(60.0).max(1.0);
        let r = area.sqrt() as f32;
        let (px, py) = (layout.map_x(x, xlo, xhi), layout.map_y(y, ylo, yhi));
        draw_filled_circle(canvas, px, py, r + 1.5, Color::BLACK);
        draw_filled_circle(canvas, px, py, r, Color::WHITE.lerp(&colors[i], 0.7));
    }

    if flag(data, "trend_line") {
        let (slope, intercept) = least_squares(&xs, &ys)?;
        let (x0, x1) = min_max(&xs);
        draw_line_dashed(
            canvas,
            layout.map_x(x0, xlo, xhi),
            layout.map_y(slope * x0 + intercept, ylo, yhi),
            layout.map_x(x1, xlo, xhi),
            layout.map_y(slope * x1 + intercept, ylo, yhi),
            4.0,
            16.0,
            10.0,
            TREND_RED,
        );
    }
    Ok(())
}

/// Slope and intercept of the least-squares line through the points.
pub(crate) fn least_squares(xs: &[f64], ys: &[f64]) -> Result<(f64, f64), QuireError> {
    let n = xs.len() as f64;
    let (mx, my) = (mean(xs), mean(ys));
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    if n < 2.0 || sxx.abs() < 1e-12 {
        return Err(QuireError::Chart("trend line needs two distinct x values".into()));
    }
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let slope = sxy / sxx;
    Ok((slope, my - slope * mx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(png: &[u8]) -> image::RgbImage {
        image::load_from_memory(png).unwrap().to_rgb8()
    }

    #[test]
    fn test_bar_renders_png() {
        let png = render(ChartKind::Bar, &json!({"labels": ["a", "b"], "values": [3, 5], "show_values": true})).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (WIDTH as u32, HEIGHT as u32));
        // Default first bar color appears somewhere
        assert!(img.pixels().any(|p| p.0 == [0x1F, 0x77, 0xB4]));
    }

    #[test]
    fn test_bar_label_mismatch_is_error() {
        assert!(render(ChartKind::Bar, &json!({"labels": ["a"], "values": [1, 2]})).is_err());
        assert!(render(ChartKind::Bar, &json!({"values": []})).is_err());
        assert!(render(ChartKind::Bar, &json!({"values": ["x"]})).is_err());
    }

    #[test]
    fn test_custom_colors_cycle() {
        let data = json!({"colors": ["#ff0000", "nope"]});
        let colors = colors_for(&data, &SERIES_COLORS, 3);
        assert_eq!(colors, vec![Color::from_u32(0xFF0000); 3]);
        assert_eq!(colors_for(&json!({}), &PIE_COLORS, 6)[5], Color::from_u32(0xFF9999));
    }

    #[test]
    fn test_pie_and_doughnut() {
        let data = json!({"labels": ["x", "y"], "values": [1, 3], "explode": [0.1, 0]});
        assert!(render(ChartKind::Pie, &data).is_ok());
        assert!(render(ChartKind::Doughnut, &data).is_ok());
        assert!(render(ChartKind::Pie, &json!({"values": [0, 0]})).is_err());
        assert!(render(ChartKind::Pie, &json!({"values": [-1, 2]})).is_err());
    }

    #[test]
    fn test_line_multi_series() {
        let data = json!({"x": ["Q1", "Q2", "Q3"], "y": [[1, 2, 3], [3, 2, 1]], "line_labels": ["up"]});
        let img = decode(&render(ChartKind::Line, &data).unwrap());
        assert!(img.pixels().any(|p| p.0 == [0xFF, 0x7F, 0x0E]));
        let bad = json!({"x": ["a", "b"], "y": [[1, 2, 3]]});
        assert!(render(ChartKind::Line, &bad).is_err());
    }

    #[test]
    fn test_line_accepts_labels_and_values() {
        assert!(render(ChartKind::Line, &json!({"labels": ["a", "b"], "values": [1, 2]})).is_ok());
    }

    #[test]
    fn test_bin_counts() {
        let counts = bin_counts(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(bin_counts(&[7.0, 7.0], 3), vec![0, 2, 0]);
    }

    #[test]
    fn test_histogram_with_stats() {
        let data = json!({"values": [1, 2, 2, 3, 3, 3, 4], "bins": 4, "show_stats": true});
        let img = decode(&render(ChartKind::Histogram, &data).unwrap());
        assert!(img.pixels().any(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn test_least_squares() {
        let (m, b) = least_squares(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9 && (b - 1.0).abs() < 1e-9);
        assert!(least_squares(&[1.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_scatter_trend() {
        let data = json!({"x": [1, 2, 3, 4], "y": [2, 4, 5, 8], "trend_line": true});
        assert!(render(ChartKind::Scatter, &data).is_ok());
        assert!(render(ChartKind::Scatter, &json!({"x": [1], "y": [1, 2]})).is_err());
    }

    #[test]
    fn test_hbar_and_non_plot_kinds() {
        assert!(render(ChartKind::Hbar, &json!({"labels": ["long label"], "values": [4], "show_values": true})).is_ok());
        assert!(render(ChartKind::Table, &json!({"values": [1]})).is_err());
    }
}
