//! Data tables: a grid of values with an optional header, styled either by
//! explicit switches or by a palette-themed preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{ContentMeta, Process, non_blank};
use crate::canvas::Stroke;
use crate::chart::label_text;
use crate::color::Color;
use crate::config::HAlign;
use crate::context::RenderContext;
use crate::element::{CellRange, Element, Paragraph, Side, Table, TableCmd, VAlign};
use crate::error::Skip;
use crate::style::TextStyle;
use crate::text::Font;

const LIGHT_GREY: Color = Color::from_u32(0xD3D3D3);

/// Named table themes drawn from the document palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TablePreset {
    #[default]
    Default,
    /// Alternating body fills.
    Striped,
    /// Rules under the header and the last row only.
    Minimal,
    /// Heavy outline with a light inner grid.
    Corporate,
}

impl TablePreset {
    pub const ALL: &'static [TablePreset] = &[
        TablePreset::Default,
        TablePreset::Striped,
        TablePreset::Minimal,
        TablePreset::Corporate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TablePreset::Default => "default",
            TablePreset::Striped => "striped",
            TablePreset::Minimal => "minimal",
            TablePreset::Corporate => "corporate",
        }
    }
}

impl fmt::Display for TablePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown names fall back to [`TablePreset::Default`].
impl FromStr for TablePreset {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(Self::ALL.iter().copied().find(|p| p.name() == lower).unwrap_or_else(|| {
            log::warn!("unknown table preset '{}', using default", s);
            TablePreset::Default
        }))
    }
}

impl Serialize for TablePreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TablePreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

fn default_border_color() -> Color {
    Color::BLACK
}

fn default_true() -> bool {
    true
}

/// Look of a table without a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLook {
    #[serde(default = "default_true")]
    pub grid: bool,
    #[serde(default = "default_border_color")]
    pub border_color: Color,
    /// Fill for a bold header row.
    #[serde(default)]
    pub header_background: Option<Color>,
    /// Light grey fill on every other body row.
    #[serde(default)]
    pub alternate_rows: bool,
}

impl Default for TableLook {
    fn default() -> Self {
        Self {
            grid: true,
            border_color: default_border_color(),
            header_background: None,
            alternate_rows: false,
        }
    }
}

impl TableLook {
    fn commands(&self, rows: usize) -> Vec<TableCmd> {
        let all = CellRange::all();
        let mut cmds = vec![
            TableCmd::Align(all, HAlign::Center),
            TableCmd::Font(all, Font::Helvetica),
            TableCmd::FontSize(all, 10.0),
            TableCmd::VAlign(all, VAlign::Middle),
            TableCmd::Padding(all, Side::Left, 6.0),
            TableCmd::Padding(all, Side::Right, 6.0),
            TableCmd::Padding(all, Side::Top, 8.0),
            TableCmd::Padding(all, Side::Bottom, 8.0),
        ];
        if self.grid {
            cmds.push(TableCmd::Grid(all, Stroke::solid(self.border_color, 1.0)));
        }
        if let Some(fill) = self.header_background {
            let header = CellRange::row(0);
            cmds.push(TableCmd::Background(header, fill));
            cmds.push(TableCmd::Font(header, Font::HelveticaBold));
            cmds.push(TableCmd::TextColor(header, Color::BLACK));
        }
        if self.alternate_rows && rows > 1 {
            cmds.extend((1..rows).step_by(2).map(|r| TableCmd::Background(CellRange::row(r as i32), LIGHT_GREY)));
        }
        cmds
    }
}

/// Style commands for `preset`, themed from the document's sheet.
pub fn preset_commands(preset: TablePreset, ctx: &RenderContext) -> Vec<TableCmd> {
    let typo = &ctx.sheet.typography;
    let theme = &ctx.sheet.table;
    let all = CellRange::all();
    let header = CellRange::row(0);
    let body = CellRange::rows(1, -1);

    let mut cmds = vec![
        TableCmd::Font(all, typo.primary_font),
        TableCmd::FontSize(all, typo.base_size),
        TableCmd::Align(all, HAlign::Center),
        TableCmd::VAlign(all, VAlign::Middle),
    ];
    let filled_header = [
        TableCmd::Background(header, theme.header_fill),
        TableCmd::TextColor(header, theme.header_text),
        TableCmd::Font(header, typo.primary_font.bold()),
    ];
    match preset {
        TablePreset::Default => {
            cmds.extend(filled_header);
            cmds.push(TableCmd::Background(body, Color::WHITE));
            cmds.push(TableCmd::Grid(all, Stroke::solid(theme.grid, 1.0)));
        }
        TablePreset::Striped => {
            cmds.extend(filled_header);
            cmds.push(TableCmd::RowBackgrounds(body, vec![Color::WHITE, theme.stripe]));
            cmds.push(TableCmd::Grid(all, Stroke::solid(theme.grid, 0.5)));
        }
        TablePreset::Minimal => {
            cmds.push(TableCmd::Font(header, typo.primary_font.bold()));
            cmds.push(TableCmd::LineBelow(header, Stroke::solid(theme.accent_rule, 2.0)));
            cmds.push(TableCmd::LineBelow(CellRange::row(-1), Stroke::solid(theme.grid, 1.0)));
        }
        TablePreset::Corporate => {
            cmds.extend(filled_header);
            cmds.push(TableCmd::Background(body, Color::WHITE));
            cmds.push(TableCmd::Box(all, Stroke::solid(theme.outline, 2.0)));
            cmds.push(TableCmd::InnerGrid(all, Stroke::solid(theme.inner, 0.5)));
        }
    }
    cmds
}

/// A text table styled by `preset`, header row repeated on split.
pub fn preset_table(rows: Vec<Vec<String>>, preset: TablePreset, ctx: &RenderContext) -> Table {
    Table::from_text(&rows)
        .repeat_rows(1)
        .style(preset_commands(preset, ctx))
}

// ============================================================================
// TABLE CONTENT
// ============================================================================

/// A titled data table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableContent {
    pub title: String,
    /// Rows of cells; numbers and strings print as-is.
    pub data: Vec<Vec<Value>>,
    /// Header row placed above `data`.
    pub headers: Option<Vec<String>>,
    /// Points per column. Without them the frame width is split evenly.
    #[serde(alias = "col_widths")]
    pub column_widths: Option<Vec<f32>>,
    /// Palette theme; overrides `style` when set.
    pub preset: Option<TablePreset>,
    pub style: TableLook,
}

impl ContentMeta for TableContent {
    fn label() -> &'static str {
        "Table"
    }
}

impl TableContent {
    pub fn new(data: Vec<Vec<Value>>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.data.len() + 1);
        if let Some(headers) = self.headers.as_ref().filter(|h| !h.is_empty()) {
            rows.push(headers.clone());
        }
        rows.extend(self.data.iter().map(|row| row.iter().map(label_text).collect()));
        rows
    }
}

/// Spacer, 12pt bold title, spacer.
pub(crate) fn titled(title: &str) -> Vec<Element> {
    let style = TextStyle::new(Font::HelveticaBold, 12.0).leading(14.4);
    vec![
        Element::Spacer(20.0),
        Paragraph::new(title, &style).into(),
        Element::Spacer(10.0),
    ]
}

impl Process for TableContent {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let rows = self.rows();
        if rows.is_empty() {
            return Err(Skip::new("table has no data"));
        }
        let n_rows = rows.len();

        let mut table = Table::from_text(&rows).repeat_rows(1);
        if let Some(widths) = self.column_widths.clone().filter(|w| !w.is_empty()) {
            table = table.col_widths(widths);
        }
        table = match self.preset {
            Some(preset) => table.style(preset_commands(preset, ctx)),
            None => table.style(self.style.commands(n_rows)),
        };

        let mut out = Vec::new();
        if let Some(title) = non_blank(&self.title) {
            out.extend(titled(title));
        }
        out.push(table.into());
        out.push(Element::Spacer(25.0));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::element::CellStyle;
    use crate::fetch::MemoryFetcher;
    use crate::output::OutputDirs;
    use crate::style::StyleSheet;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(content: &TableContent) -> Result<Vec<Element>, Skip> {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        content.process(&ctx)
    }

    fn table_of(elements: &[Element]) -> &Table {
        elements
            .iter()
            .find_map(|e| match e {
                Element::Table(t) => Some(t),
                _ => None,
            })
            .unwrap()
    }

    fn styles(elements: &[Element]) -> Vec<Vec<CellStyle>> {
        table_of(elements).cell_styles()
    }

    #[test]
    fn test_titled_table_layout() {
        let content: TableContent = serde_json::from_value(json!({
            "title": "Inventory",
            "data": [["Item", "Qty"], ["bolts", 40]],
        }))
        .unwrap();
        let out = run(&content).unwrap();
        let kinds: Vec<&str> = out.iter().map(Element::kind).collect();
        assert_eq!(kinds, vec!["spacer", "paragraph", "spacer", "table", "spacer"]);
        assert_eq!(out[4], Element::Spacer(25.0));
        assert_eq!(table_of(&out).rows()[1][1], "40".into());
    }

    #[test]
    fn test_default_look() {
        let content = TableContent::new(vec![vec![json!("a")], vec![json!("b")], vec![json!("c")]]);
        let out = run(&content).unwrap();
        let st = styles(&out);
        assert_eq!(st[0][0].size, 10.0);
        assert_eq!(st[0][0].pad_top, 8.0);
        assert_eq!(st[0][0].pad_left, 6.0);
        assert_eq!(st[0][0].top, Some(Stroke::solid(Color::BLACK, 1.0)));
        assert_eq!(st[1][0].background, None);
    }

    #[test]
    fn test_header_and_alternate_rows() {
        let mut content = TableContent::new(vec![
            vec![json!("h")],
            vec![json!("1")],
            vec![json!("2")],
            vec![json!("3")],
        ]);
        content.style.header_background = Some(Color::from_u32(0x336699));
        content.style.alternate_rows = true;
        let st = styles(&run(&content).unwrap());
        assert_eq!(st[0][0].font, Font::HelveticaBold);
        assert_eq!(st[1][0].background, Some(LIGHT_GREY));
        assert_eq!(st[2][0].background, None);
        assert_eq!(st[3][0].background, Some(LIGHT_GREY));
    }

    #[test]
    fn test_presets_use_palette() {
        let mut content = TableContent::new(vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]]);
        content.headers = Some(vec!["A".into(), "B".into()]);
        content.preset = Some(TablePreset::Corporate);
        let out = run(&content).unwrap();
        let palette = DocumentConfig::default().palette().clone();
        let st = styles(&out);
        assert_eq!(table_of(&out).n_rows(), 3);
        assert_eq!(st[0][0].background, Some(palette.primary));
        assert_eq!(st[0][0].color, Color::WHITE);
        assert_eq!(st[0][0].top, Some(Stroke::solid(palette.primary, 2.0)));
        assert_eq!(st[1][0].right, Some(Stroke::solid(palette.secondary, 0.5)));
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let content: TableContent = serde_json::from_value(json!({"data": [["x"]], "preset": "neon"})).unwrap();
        assert_eq!(content.preset, Some(TablePreset::Default));
    }

    #[test]
    fn test_empty_table_skipped() {
        assert!(run(&TableContent::default()).is_err());
    }

    #[test]
    fn test_oversized_widths_still_render() {
        let mut content = TableContent::new(vec![vec![json!("a"), json!("b")]]);
        content.column_widths = Some(vec![400.0, 400.0]);
        let out = run(&content).unwrap();
        assert_eq!(table_of(&out).width(468.0), 800.0);
    }
}
