//! Boxed primitives: info boxes, gradient boxes, KPI tiles and dashboards.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Shape, paint_gradient, truncate_chars};
use crate::canvas::{DrawOp, PageCanvas, Stroke};
use crate::color::Color;
use crate::config::{ColorPalette, GradientDirection, HAlign, INCH};
use crate::element::Size;
use crate::error::QuireError;
use crate::text::Font;

// ============================================================================
// INFO BOX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    #[default]
    Info,
    Warning,
    Error,
    Success,
    Tip,
}

impl InfoKind {
    /// `(fill, border)`
    pub fn colors(self) -> (Color, Color) {
        match self {
            InfoKind::Info => (Color::from_u32(0xADD8E6), Color::from_u32(0x0000FF)),
            InfoKind::Warning => (Color::from_u32(0xFFFFE0), Color::from_u32(0xFFA500)),
            InfoKind::Error => (Color::from_u32(0xFFC0CB), Color::from_u32(0xFF0000)),
            InfoKind::Success => (Color::from_u32(0x90EE90), Color::from_u32(0x008000)),
            InfoKind::Tip => (Color::from_u32(0xD3D3D3), Color::from_u32(0x808080)),
        }
    }

    /// Marker drawn in the corner; limited to WinAnsi glyphs.
    pub fn icon(self) -> &'static str {
        match self {
            InfoKind::Info => "i",
            InfoKind::Warning => "!",
            InfoKind::Error => "\u{d7}",
            InfoKind::Success => "+",
            InfoKind::Tip => "*",
        }
    }
}

impl FromStr for InfoKind {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(InfoKind::Info),
            "warning" => Ok(InfoKind::Warning),
            "error" => Ok(InfoKind::Error),
            "success" => Ok(InfoKind::Success),
            "tip" => Ok(InfoKind::Tip),
            other => Err(QuireError::InvalidConfig(format!("unknown info box type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoBox {
    pub content: String,
    pub kind: InfoKind,
    pub width: f32,
}

const INFO_MAX_LINES: usize = 5;
const INFO_LINE_CHARS: usize = 60;

impl InfoBox {
    pub fn new(content: impl Into<String>, kind: InfoKind) -> Self {
        Self {
            content: content.into(),
            kind,
            width: 6.0 * INCH,
        }
    }
}

impl Shape for InfoBox {
    fn size(&self, avail_width: f32) -> Size {
        let lines = self.content.split('\n').count() as f32;
        Size::new(self.width.min(avail_width), (lines * 0.3 * INCH).max(INCH))
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let (fill, border) = self.kind.colors();
        canvas.push(DrawOp::RoundRect {
            x,
            y,
            w: size.width,
            h: size.height,
            radius: 10.0,
            fill: Some(fill),
            stroke: Some(Stroke::solid(border, 2.0)),
        });
        let top = y + size.height;
        canvas.text(x + 15.0, top - 25.0, Font::HelveticaBold, 16.0, border, self.kind.icon());

        let mut line_y = top - 25.0;
        for line in self.content.split('\n').take(INFO_MAX_LINES) {
            canvas.text(
                x + 45.0,
                line_y,
                Font::Helvetica,
                10.0,
                Color::BLACK,
                truncate_chars(line, INFO_LINE_CHARS),
            );
            line_y -= 15.0;
        }
    }
}

// ============================================================================
// GRADIENT BOX
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GradientBox {
    pub width: f32,
    pub height: f32,
    pub start: Color,
    pub end: Color,
    pub direction: GradientDirection,
}

impl GradientBox {
    pub fn new(width: f32, height: f32, start: Color, end: Color) -> Self {
        Self {
            width,
            height,
            start,
            end,
            direction: GradientDirection::Horizontal,
        }
    }
}

impl Shape for GradientBox {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(self.width.min(avail_width), self.height)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        paint_gradient(
            canvas,
            x,
            y,
            size.width,
            size.height,
            self.start,
            self.end,
            self.direction,
        );
    }
}

// ============================================================================
// KPI TILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiSpec {
    pub title: String,
    pub value: String,
    pub subtitle: String,
    /// Leading `+` reads as good news.
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiTile {
    pub spec: KpiSpec,
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub primary: Color,
    pub text: Color,
    pub success: Color,
    pub error: Color,
}

impl KpiTile {
    pub fn new(spec: KpiSpec, palette: &ColorPalette) -> Self {
        Self {
            spec,
            width: 2.0 * INCH,
            height: 1.5 * INCH,
            background: palette.background,
            primary: palette.primary,
            text: palette.text,
            success: palette.success,
            error: palette.error,
        }
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Shape for KpiTile {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(self.width.min(avail_width), self.height)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let (w, h) = (size.width, size.height);
        canvas.push(DrawOp::RoundRect {
            x,
            y,
            w,
            h,
            radius: 10.0,
            fill: Some(self.background),
            stroke: Some(Stroke::solid(self.primary, 2.0)),
        });
        canvas.push(DrawOp::RoundRect {
            x,
            y: y + h - 30.0,
            w,
            h: 30.0,
            radius: 10.0,
            fill: Some(self.primary),
            stroke: None,
        });

        let cx = x + w / 2.0;
        let s = &self.spec;
        canvas.text_aligned(cx, y + h - 20.0, HAlign::Center, Font::HelveticaBold, 10.0, Color::WHITE, &s.title);
        canvas.text_aligned(cx, y + h / 2.0 + 10.0, HAlign::Center, Font::HelveticaBold, 24.0, self.primary, &s.value);
        if !s.subtitle.is_empty() {
            canvas.text_aligned(cx, y + h / 2.0 - 20.0, HAlign::Center, Font::Helvetica, 8.0, self.text, &s.subtitle);
        }
        if !s.trend.is_empty() {
            let color = if s.trend.starts_with('+') { self.success } else { self.error };
            canvas.text_aligned(cx, y + 15.0, HAlign::Center, Font::HelveticaBold, 10.0, color, &s.trend);
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// KPI tiles laid out on a grid; empty trailing cells stay blank.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardGrid {
    pub tiles: Vec<KpiTile>,
    pub columns: usize,
    pub width: f32,
    pub height: f32,
    pub gap: f32,
}

impl DashboardGrid {
    pub fn new(specs: Vec<KpiSpec>, columns: usize, palette: &ColorPalette) -> Self {
        Self {
            tiles: specs.into_iter().map(|s| KpiTile::new(s, palette)).collect(),
            columns: columns.max(1),
            width: 6.0 * INCH,
            height: 4.0 * INCH,
            gap: 0.2 * INCH,
        }
    }

    pub fn rows(&self) -> usize {
        self.tiles.len().div_ceil(self.columns)
    }

    /// Tile size for a grid `width` wide.
    pub fn tile_size(&self, width: f32) -> Size {
        let cols = self.columns as f32;
        let rows = self.rows().max(1) as f32;
        Size::new(
            (width - (cols - 1.0) * self.gap) / cols,
            (self.height - (rows - 1.0) * self.gap) / rows,
        )
    }
}

impl Shape for DashboardGrid {
    fn size(&self, avail_width: f32) -> Size {
        Size::new(self.width.min(avail_width), self.height)
    }

    fn paint(&self, canvas: &mut PageCanvas, x: f32, y: f32, size: Size) {
        let tile = self.tile_size(size.width);
        let top = y + size.height;
        for (i, t) in self.tiles.iter().enumerate() {
            let (row, col) = (i / self.columns, i % self.columns);
            let tx = x + col as f32 * (tile.width + self.gap);
            let ty = top - (row + 1) as f32 * tile.height - row as f32 * self.gap;
            t.paint(canvas, tx, ty, tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_box_min_height() {
        let b = InfoBox::new("one line", InfoKind::Info);
        assert_eq!(b.size(1000.0).height, 72.0);
        let b = InfoBox::new("1\n2\n3\n4\n5\n6", InfoKind::Tip);
        assert!((b.size(1000.0).height - 6.0 * 21.6).abs() < 1e-3);
    }

    #[test]
    fn test_info_box_draws_at_most_five_lines() {
        let b = InfoBox::new("1\n2\n3\n4\n5\n6\n7", InfoKind::Warning);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        let size = b.size(468.0);
        b.paint(&mut canvas, 0.0, 0.0, size);
        let texts = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .count();
        assert_eq!(texts, 1 + 5);
    }

    #[test]
    fn test_info_kind_parse() {
        assert_eq!("WARNING".parse::<InfoKind>().unwrap(), InfoKind::Warning);
        assert!("nope".parse::<InfoKind>().is_err());
    }

    #[test]
    fn test_kpi_trend_color() {
        let pal = ColorPalette::default();
        let spec = KpiSpec {
            title: "Revenue".into(),
            value: "$1M".into(),
            subtitle: String::new(),
            trend: "-3%".into(),
        };
        let tile = KpiTile::new(spec, &pal);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        tile.paint(&mut canvas, 0.0, 0.0, tile.size(500.0));
        let trend = canvas.ops().iter().find_map(|op| match op {
            DrawOp::Text { text, color, .. } if text == "-3%" => Some(*color),
            _ => None,
        });
        assert_eq!(trend, Some(pal.error));
    }

    #[test]
    fn test_dashboard_grid_geometry() {
        let pal = ColorPalette::default();
        let grid = DashboardGrid::new(vec![KpiSpec::default(); 3], 2, &pal);
        assert_eq!(grid.rows(), 2);
        let tile = grid.tile_size(432.0);
        assert!((tile.width - (432.0 - 14.4) / 2.0).abs() < 1e-3);
        assert!((tile.height - (288.0 - 14.4) / 2.0).abs() < 1e-3);
    }
}
