//! Grid tables with command-based styling.
//!
//! Styling works like a small command language: each [`TableCmd`] targets a
//! [`CellRange`] (negative indices count from the end) and commands apply in
//! order, later ones overriding earlier ones. Commands are resolved to
//! per-cell styles before a table is split across frames, so a continuation
//! keeps the look of the rows it carries.

use crate::canvas::{PageCanvas, Stroke};
use crate::color::Color;
use crate::config::HAlign;
use crate::text::Font;

use super::{Element, draw_flow, flow_height};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Nested elements laid out top to bottom inside the cell.
    Flow(Vec<Element>),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Element> for Cell {
    fn from(e: Element) -> Self {
        Cell::Flow(vec![e])
    }
}

/// Inclusive cell rectangle, `(col, row)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl CellRange {
    pub const fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self { start, end }
    }

    pub const fn all() -> Self {
        Self::new((0, 0), (-1, -1))
    }

    pub const fn row(r: i32) -> Self {
        Self::new((0, r), (-1, r))
    }

    pub const fn rows(from: i32, to: i32) -> Self {
        Self::new((0, from), (-1, to))
    }

    pub const fn col(c: i32) -> Self {
        Self::new((c, 0), (c, -1))
    }

    /// Concrete `(c0, r0, c1, r1)` for a `cols` x `rows` grid, or `None` if empty.
    fn resolve(&self, cols: usize, rows: usize) -> Option<(usize, usize, usize, usize)> {
        let fix = |i: i32, n: usize| -> Option<usize> {
            let v = if i < 0 { n as i64 + i as i64 } else { i as i64 };
            (0..n as i64).contains(&v).then_some(v as usize)
        };
        let c0 = fix(self.start.0, cols)?;
        let r0 = fix(self.start.1, rows)?;
        let c1 = fix(self.end.0, cols)?;
        let r1 = fix(self.end.1, rows)?;
        (c0 <= c1 && r0 <= r1).then_some((c0, r0, c1, r1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCmd {
    Background(CellRange, Color),
    /// Cycle fills over the rows of the range.
    RowBackgrounds(CellRange, Vec<Color>),
    TextColor(CellRange, Color),
    Font(CellRange, Font),
    FontSize(CellRange, f32),
    Align(CellRange, HAlign),
    VAlign(CellRange, VAlign),
    Padding(CellRange, Side, f32),
    Grid(CellRange, Stroke),
    Box(CellRange, Stroke),
    InnerGrid(CellRange, Stroke),
    LineAbove(CellRange, Stroke),
    LineBelow(CellRange, Stroke),
    LineBefore(CellRange, Stroke),
    LineAfter(CellRange, Stroke),
}

/// Resolved look of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
    pub align: HAlign,
    pub valign: VAlign,
    pub pad_top: f32,
    pub pad_bottom: f32,
    pub pad_left: f32,
    pub pad_right: f32,
    pub background: Option<Color>,
    pub top: Option<Stroke>,
    pub bottom: Option<Stroke>,
    pub left: Option<Stroke>,
    pub right: Option<Stroke>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font: Font::Helvetica,
            size: 10.0,
            color: Color::BLACK,
            align: HAlign::Left,
            valign: VAlign::Middle,
            pad_top: 3.0,
            pad_bottom: 3.0,
            pad_left: 6.0,
            pad_right: 6.0,
            background: None,
            top: None,
            bottom: None,
            left: None,
            right: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
    col_widths: Option<Vec<f32>>,
    commands: Vec<TableCmd>,
    repeat_rows: usize,
    pub align: HAlign,
    resolved: Option<Vec<Vec<CellStyle>>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            rows,
            col_widths: None,
            commands: Vec::new(),
            repeat_rows: 0,
            align: HAlign::Center,
            resolved: None,
        }
    }

    /// Table of plain text cells.
    pub fn from_text<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::Text(c.as_ref().to_string())).collect())
                .collect(),
        )
    }

    pub fn col_widths(mut self, widths: Vec<f32>) -> Self {
        self.col_widths = Some(widths);
        self
    }

    pub fn style(mut self, commands: impl IntoIterator<Item = TableCmd>) -> Self {
        self.commands.extend(commands);
        self.resolved = None;
        self
    }

    pub fn repeat_rows(mut self, n: usize) -> Self {
        self.repeat_rows = n;
        self
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Column widths for `avail_width`. Explicit widths win even when they
    /// overflow; missing ones share what is left.
    pub fn widths(&self, avail_width: f32) -> Vec<f32> {
        let n = self.n_cols();
        if n == 0 {
            return Vec::new();
        }
        match &self.col_widths {
            Some(given) => {
                let fixed: f32 = given.iter().take(n).sum();
                let missing = n.saturating_sub(given.len());
                let share = if missing > 0 {
                    ((avail_width - fixed) / missing as f32).max(avail_width / n as f32 / 2.0)
                } else {
                    0.0
                };
                let widths: Vec<f32> = (0..n).map(|i| given.get(i).copied().unwrap_or(share)).collect();
                let total: f32 = widths.iter().sum();
                if total > avail_width + 0.5 {
                    log::debug!(
                        "table columns total {:.1}pt exceed available {:.1}pt; rendering anyway",
                        total,
                        avail_width
                    );
                }
                widths
            }
            None => vec![avail_width / n as f32; n],
        }
    }

    pub fn cell_styles(&self) -> Vec<Vec<CellStyle>> {
        match &self.resolved {
            Some(styles) => styles.clone(),
            None => resolve_styles(&self.commands, self.n_cols(), self.n_rows()),
        }
    }

    fn cell(&self, r: usize, c: usize) -> Option<&Cell> {
        self.rows.get(r).and_then(|row| row.get(c))
    }

    fn content_height(cell: Option<&Cell>, style: &CellStyle, width: f32) -> f32 {
        match cell {
            Some(Cell::Text(text)) => text_lines(text).len() as f32 * style.size * 1.2,
            Some(Cell::Flow(elements)) => flow_height(elements, width),
            None => style.size * 1.2,
        }
    }

    pub fn row_heights(&self, avail_width: f32) -> Vec<f32> {
        let widths = self.widths(avail_width);
        let styles = self.cell_styles();
        (0..self.n_rows())
            .map(|r| {
                widths
                    .iter()
                    .enumerate()
                    .map(|(c, w)| {
                        let st = &styles[r][c];
                        let inner = (w - st.pad_left - st.pad_right).max(1.0);
                        Self::content_height(self.cell(r, c), st, inner) + st.pad_top + st.pad_bottom
                    })
                    .fold(0.0, f32::max)
            })
            .collect()
    }

    pub fn width(&self, avail_width: f32) -> f32 {
        self.widths(avail_width).iter().sum()
    }

    pub fn height(&self, avail_width: f32) -> f32 {
        self.row_heights(avail_width).iter().sum()
    }

    /// Split by rows so the head fits `avail_height`. Header rows
    /// (`repeat_rows`) are repeated at the top of the tail.
    pub fn split(&self, avail_width: f32, avail_height: f32) -> Option<(Table, Table)> {
        let heights = self.row_heights(avail_width);
        let mut used = 0.0;
        let mut fit = 0;
        for h in &heights {
            if used + h > avail_height {
                break;
            }
            used += h;
            fit += 1;
        }
        let header = self.repeat_rows.min(self.n_rows());
        if fit <= header || fit >= self.n_rows() {
            return None;
        }

        let styles = self.cell_styles();
        let head = Table {
            rows: self.rows[..fit].to_vec(),
            col_widths: Some(self.widths(avail_width)),
            commands: Vec::new(),
            repeat_rows: header,
            align: self.align,
            resolved: Some(styles[..fit].to_vec()),
        };
        let mut tail_rows = self.rows[..header].to_vec();
        tail_rows.extend_from_slice(&self.rows[fit..]);
        let mut tail_styles = styles[..header].to_vec();
        tail_styles.extend_from_slice(&styles[fit..]);
        let tail = Table {
            rows: tail_rows,
            col_widths: Some(self.widths(avail_width)),
            commands: Vec::new(),
            repeat_rows: header,
            align: self.align,
            resolved: Some(tail_styles),
        };
        Some((head, tail))
    }

    pub fn draw(&self, canvas: &mut PageCanvas, x: f32, top: f32, avail_width: f32) {
        let widths = self.widths(avail_width);
        let heights = self.row_heights(avail_width);
        let styles = self.cell_styles();
        let table_w: f32 = widths.iter().sum();
        let x0 = x + match self.align {
            HAlign::Center => ((avail_width - table_w) / 2.0).max(0.0),
            HAlign::Right => (avail_width - table_w).max(0.0),
            _ => 0.0,
        };

        let col_x: Vec<f32> = widths
            .iter()
            .scan(x0, |acc, w| {
                let left = *acc;
                *acc += w;
                Some(left)
            })
            .collect();
        let row_top: Vec<f32> = heights
            .iter()
            .scan(top, |acc, h| {
                let t = *acc;
                *acc -= h;
                Some(t)
            })
            .collect();

        let cells = || {
            (0..heights.len()).flat_map(|r| (0..widths.len()).map(move |c| (r, c)))
        };

        for (r, c) in cells() {
            if let Some(bg) = styles[r][c].background {
                canvas.fill_rect(col_x[c], row_top[r] - heights[r], widths[c], heights[r], bg);
            }
        }

        for (r, c) in cells() {
            let st = &styles[r][c];
            let inner_w = (widths[c] - st.pad_left - st.pad_right).max(1.0);
            let content_h = Self::content_height(self.cell(r, c), st, inner_w);
            let cell_top = row_top[r];
            let content_top = match st.valign {
                VAlign::Top => cell_top - st.pad_top,
                VAlign::Bottom => cell_top - heights[r] + st.pad_bottom + content_h,
                VAlign::Middle => {
                    let inner_h = heights[r] - st.pad_top - st.pad_bottom;
                    cell_top - st.pad_top - (inner_h - content_h) / 2.0
                }
            };
            match self.cell(r, c) {
                Some(Cell::Text(text)) => {
                    let lh = st.size * 1.2;
                    for (i, line) in text_lines(text).iter().enumerate() {
                        let line_top = content_top - i as f32 * lh;
                        let glyph_h = st.size * (st.font.ascent() + st.font.descent());
                        let baseline = line_top - (lh - glyph_h) / 2.0 - st.size * st.font.ascent();
                        let lw = st.font.text_width(line, st.size);
                        let lx = match st.align {
                            HAlign::Center => col_x[c] + (widths[c] - lw) / 2.0,
                            HAlign::Right => col_x[c] + widths[c] - st.pad_right - lw,
                            _ => col_x[c] + st.pad_left,
                        };
                        canvas.text(lx, baseline, st.font, st.size, st.color, line.as_str());
                    }
                }
                Some(Cell::Flow(elements)) => {
                    draw_flow(elements, canvas, col_x[c] + st.pad_left, content_top, inner_w);
                }
                None => {}
            }
        }

        for (r, c) in cells() {
            let st = &styles[r][c];
            let (left, right) = (col_x[c], col_x[c] + widths[c]);
            let (upper, lower) = (row_top[r], row_top[r] - heights[r]);
            if let Some(s) = st.top {
                canvas.line(left, upper, right, upper, s);
            }
            if let Some(s) = st.bottom {
                canvas.line(left, lower, right, lower, s);
            }
            if let Some(s) = st.left {
                canvas.line(left, upper, left, lower, s);
            }
            if let Some(s) = st.right {
                canvas.line(right, upper, right, lower, s);
            }
        }
    }
}

fn text_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

fn resolve_styles(commands: &[TableCmd], cols: usize, rows: usize) -> Vec<Vec<CellStyle>> {
    let mut styles = vec![vec![CellStyle::default(); cols]; rows];
    for cmd in commands {
        let range = match cmd {
            TableCmd::Background(r, _)
            | TableCmd::RowBackgrounds(r, _)
            | TableCmd::TextColor(r, _)
            | TableCmd::Font(r, _)
            | TableCmd::FontSize(r, _)
            | TableCmd::Align(r, _)
            | TableCmd::VAlign(r, _)
            | TableCmd::Padding(r, _, _)
            | TableCmd::Grid(r, _)
            | TableCmd::Box(r, _)
            | TableCmd::InnerGrid(r, _)
            | TableCmd::LineAbove(r, _)
            | TableCmd::LineBelow(r, _)
            | TableCmd::LineBefore(r, _)
            | TableCmd::LineAfter(r, _) => r,
        };
        let Some((c0, r0, c1, r1)) = range.resolve(cols, rows) else {
            continue;
        };
        for r in r0..=r1 {
            for c in c0..=c1 {
                let st = &mut styles[r][c];
                match cmd {
                    TableCmd::Background(_, color) => st.background = Some(*color),
                    TableCmd::RowBackgrounds(_, fills) => {
                        if !fills.is_empty() {
                            st.background = Some(fills[(r - r0) % fills.len()]);
                        }
                    }
                    TableCmd::TextColor(_, color) => st.color = *color,
                    TableCmd::Font(_, font) => st.font = *font,
                    TableCmd::FontSize(_, size) => st.size = *size,
                    TableCmd::Align(_, align) => st.align = *align,
                    TableCmd::VAlign(_, valign) => st.valign = *valign,
                    TableCmd::Padding(_, side, v) => match side {
                        Side::Top => st.pad_top = *v,
                        Side::Bottom => st.pad_bottom = *v,
                        Side::Left => st.pad_left = *v,
                        Side::Right => st.pad_right = *v,
                        Side::All => {
                            st.pad_top = *v;
                            st.pad_bottom = *v;
                            st.pad_left = *v;
                            st.pad_right = *v;
                        }
                    },
                    TableCmd::Grid(_, s) => {
                        st.top = Some(*s);
                        st.bottom = Some(*s);
                        st.left = Some(*s);
                        st.right = Some(*s);
                    }
                    TableCmd::Box(_, s) => {
                        if r == r0 {
                            st.top = Some(*s);
                        }
                        if r == r1 {
                            st.bottom = Some(*s);
                        }
                        if c == c0 {
                            st.left = Some(*s);
                        }
                        if c == c1 {
                            st.right = Some(*s);
                        }
                    }
                    TableCmd::InnerGrid(_, s) => {
                        if r > r0 {
                            st.top = Some(*s);
                        }
                        if r < r1 {
                            st.bottom = Some(*s);
                        }
                        if c > c0 {
                            st.left = Some(*s);
                        }
                        if c < c1 {
                            st.right = Some(*s);
                        }
                    }
                    TableCmd::LineAbove(_, s) => st.top = Some(*s),
                    TableCmd::LineBelow(_, s) => st.bottom = Some(*s),
                    TableCmd::LineBefore(_, s) => st.left = Some(*s),
                    TableCmd::LineAfter(_, s) => st.right = Some(*s),
                }
            }
        }
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;

    fn count_lines(canvas: &PageCanvas) -> usize {
        canvas.ops().iter().filter(|op| matches!(op, DrawOp::Line { .. })).count()
    }

    fn grid() -> Table {
        Table::from_text(&[
            vec!["Name", "Qty"],
            vec!["a", "1"],
            vec!["b", "2"],
            vec!["c", "3"],
        ])
    }

    #[test]
    fn test_even_widths_by_default() {
        assert_eq!(grid().widths(400.0), vec![200.0, 200.0]);
    }

    #[test]
    fn test_oversized_widths_are_kept() {
        let t = grid().col_widths(vec![400.0, 400.0]);
        assert_eq!(t.width(300.0), 800.0);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        t.draw(&mut canvas, 72.0, 700.0, 300.0);
        assert!(!canvas.ops().is_empty());
    }

    #[test]
    fn test_negative_ranges() {
        assert_eq!(CellRange::all().resolve(3, 4), Some((0, 0, 2, 3)));
        assert_eq!(CellRange::row(-1).resolve(3, 4), Some((0, 3, 2, 3)));
        assert_eq!(CellRange::row(5).resolve(3, 4), None);
    }

    #[test]
    fn test_row_height_uses_font_and_padding() {
        let t = grid();
        assert_eq!(t.row_heights(200.0), vec![18.0; 4]);
        let t = grid().style([TableCmd::FontSize(CellRange::row(0), 20.0)]);
        assert_eq!(t.row_heights(200.0)[0], 30.0);
    }

    #[test]
    fn test_later_commands_override() {
        let t = grid().style([
            TableCmd::Background(CellRange::all(), Color::WHITE),
            TableCmd::Background(CellRange::row(0), Color::BLACK),
        ]);
        let styles = t.cell_styles();
        assert_eq!(styles[0][1].background, Some(Color::BLACK));
        assert_eq!(styles[1][1].background, Some(Color::WHITE));
    }

    #[test]
    fn test_row_backgrounds_cycle() {
        let a = Color::WHITE;
        let b = Color::BLACK;
        let t = grid().style([TableCmd::RowBackgrounds(CellRange::rows(1, -1), vec![a, b])]);
        let styles = t.cell_styles();
        assert_eq!(styles[0][0].background, None);
        assert_eq!(styles[1][0].background, Some(a));
        assert_eq!(styles[2][0].background, Some(b));
        assert_eq!(styles[3][0].background, Some(a));
    }

    #[test]
    fn test_box_and_inner_grid_edges() {
        let s = Stroke::solid(Color::BLACK, 1.0);
        let t = grid().style([TableCmd::Box(CellRange::all(), s)]);
        let styles = t.cell_styles();
        assert!(styles[0][0].top.is_some() && styles[0][0].left.is_some());
        assert!(styles[1][0].top.is_none());
        assert!(styles[3][1].bottom.is_some() && styles[3][1].right.is_some());

        let t = grid().style([TableCmd::InnerGrid(CellRange::all(), s)]);
        let styles = t.cell_styles();
        assert!(styles[0][0].top.is_none());
        assert!(styles[0][0].right.is_some());
        assert!(styles[1][1].top.is_some());
    }

    #[test]
    fn test_split_repeats_header() {
        let t = grid()
            .repeat_rows(1)
            .style([TableCmd::Background(CellRange::row(0), Color::BLACK)]);
        let (head, tail) = t.split(200.0, 40.0).unwrap();
        assert_eq!(head.n_rows(), 2);
        assert_eq!(tail.n_rows(), 3);
        assert_eq!(tail.rows()[0], vec![Cell::from("Name"), Cell::from("Qty")]);
        assert_eq!(tail.cell_styles()[0][0].background, Some(Color::BLACK));
        assert_eq!(tail.cell_styles()[1][0].background, None);
    }

    #[test]
    fn test_split_needs_a_body_row() {
        let t = grid().repeat_rows(1);
        assert!(t.split(200.0, 20.0).is_none());
        assert!(t.split(200.0, 1000.0).is_none());
    }

    #[test]
    fn test_grid_draws_four_edges_per_cell() {
        let t = Table::from_text(&[vec!["x"]]).style([TableCmd::Grid(
            CellRange::all(),
            Stroke::solid(Color::BLACK, 1.0),
        )]);
        let mut canvas = PageCanvas::new(612.0, 792.0);
        t.draw(&mut canvas, 0.0, 700.0, 100.0);
        assert_eq!(count_lines(&canvas), 4);
    }
}
