//! Boxed and graphic content: summaries, text boxes, callouts, column
//! layouts and wrappers around the graphic primitives.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{ContentMeta, Process, non_blank, table::titled};
use crate::canvas::Stroke;
use crate::chart::summary_lines;
use crate::color::Color;
use crate::config::INCH;
use crate::context::RenderContext;
use crate::element::{Cell, CellRange, Element, Paragraph, Side, Table, TableCmd, VAlign};
use crate::error::{QuireError, Skip};
use crate::primitives::{DashboardGrid, InfoBox, InfoKind, KpiSpec, ProgressBar, Timeline, TimelineEvent};
use crate::style::TextStyle;
use crate::text::Font;

/// A single filled, outlined cell holding `flow`.
pub(crate) struct Frame {
    pub width: Option<f32>,
    pub fill: Option<Color>,
    pub border: Option<Stroke>,
    /// Left/right padding.
    pub pad_x: f32,
    /// Top/bottom padding.
    pub pad_y: f32,
    pub valign: VAlign,
}

impl Frame {
    pub fn new(fill: Option<Color>, border: Option<Stroke>, pad_x: f32, pad_y: f32) -> Self {
        Self {
            width: None,
            fill,
            border,
            pad_x,
            pad_y,
            valign: VAlign::Top,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn wrap(self, flow: Vec<Element>) -> Element {
        let all = CellRange::all();
        let mut cmds = vec![
            TableCmd::VAlign(all, self.valign),
            TableCmd::Padding(all, Side::Left, self.pad_x),
            TableCmd::Padding(all, Side::Right, self.pad_x),
            TableCmd::Padding(all, Side::Top, self.pad_y),
            TableCmd::Padding(all, Side::Bottom, self.pad_y),
        ];
        if let Some(fill) = self.fill {
            cmds.push(TableCmd::Background(all, fill));
        }
        if let Some(stroke) = self.border {
            cmds.push(TableCmd::Box(all, stroke));
        }
        let mut table = Table::new(vec![vec![Cell::Flow(flow)]]).style(cmds);
        if let Some(w) = self.width {
            table = table.col_widths(vec![w]);
        }
        table.into()
    }
}

fn body_11() -> TextStyle {
    TextStyle::new(Font::Helvetica, 11.0).leading(14.0)
}

// ============================================================================
// EXECUTIVE SUMMARY
// ============================================================================

const SUMMARY_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveSummary {
    pub title: String,
    pub summary: String,
}

impl ExecutiveSummary {
    fn clipped(&self) -> String {
        let summary = self.summary.trim();
        if summary.chars().count() > SUMMARY_LIMIT {
            let head: String = summary.chars().take(SUMMARY_LIMIT).collect();
            format!("{}...", head)
        } else {
            summary.to_string()
        }
    }
}

impl ContentMeta for ExecutiveSummary {
    fn label() -> &'static str {
        "Executive Summary"
    }
}

impl Process for ExecutiveSummary {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let mut flow = Vec::new();
        if let Some(title) = non_blank(&self.title) {
            let style = TextStyle::new(Font::HelveticaBold, 14.0).spacing(0.0, 8.0);
            flow.push(Paragraph::new(title, &style).into());
        }
        if !self.summary.trim().is_empty() {
            flow.push(Paragraph::new(&self.clipped(), &body_11()).into());
        }
        if flow.is_empty() {
            return Err(Skip::new("summary has neither title nor text"));
        }
        let frame = Frame::new(
            Some(Color::from_u32(0xFFFFE0)),
            Some(Stroke::solid(Color::from_u32(0xFFA500), 1.0)),
            12.0,
            10.0,
        )
        .width(6.0 * INCH);
        Ok(vec![frame.wrap(flow), Element::Spacer(15.0)])
    }
}

// ============================================================================
// MULTI-COLUMN
// ============================================================================

const MAX_COLUMNS: usize = 4;

fn default_column_spacing() -> f32 {
    12.0
}

/// Side-by-side text columns of equal width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiColumn {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default = "default_column_spacing")]
    pub spacing: f32,
}

impl MultiColumn {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            spacing: default_column_spacing(),
        }
    }
}

impl ContentMeta for MultiColumn {
    fn label() -> &'static str {
        "Multi-Column"
    }
}

impl Process for MultiColumn {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.columns.is_empty() {
            return Err(Skip::new("no columns"));
        }
        if self.columns.len() > MAX_COLUMNS {
            log::warn!("{} columns requested, keeping the first {}", self.columns.len(), MAX_COLUMNS);
        }
        let columns = &self.columns[..self.columns.len().min(MAX_COLUMNS)];
        let n = columns.len();
        let spacing = self.spacing.max(6.0);

        let style = body_11().spacing(5.0, 5.0);
        let row: Vec<Cell> = columns
            .iter()
            .map(|text| match non_blank(text) {
                Some(text) => Cell::from(Element::from(Paragraph::new(text, &style))),
                None => Cell::from(""),
            })
            .collect();

        let all = CellRange::all();
        let mut cmds = vec![
            TableCmd::VAlign(all, VAlign::Top),
            TableCmd::Padding(all, Side::Left, 6.0),
            TableCmd::Padding(all, Side::Right, 6.0),
            TableCmd::Padding(all, Side::Top, 0.0),
            TableCmd::Padding(all, Side::Bottom, 0.0),
        ];
        if n > 1 {
            let separators = CellRange::new((0, 0), (n as i32 - 2, -1));
            cmds.push(TableCmd::LineAfter(separators, Stroke::solid(Color::from_u32(0xD3D3D3), 0.5)));
        }
        let width = ctx.frame_width() / n as f32;
        let table = Table::new(vec![row]).col_widths(vec![width; n]).style(cmds);
        Ok(vec![table.into(), Element::Spacer(spacing)])
    }
}

// ============================================================================
// TEXT BOX
// ============================================================================

fn default_box_fill() -> Color {
    Color::from_u32(0xF0F0F0)
}

fn default_box_border() -> Color {
    Color::BLACK
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_box_fill", alias = "background")]
    pub background_color: Color,
    #[serde(default = "default_box_border")]
    pub border_color: Color,
}

impl TextBox {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            background_color: default_box_fill(),
            border_color: default_box_border(),
        }
    }
}

impl ContentMeta for TextBox {
    fn label() -> &'static str {
        "Text Box"
    }
}

impl Process for TextBox {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let text = non_blank(&self.text).ok_or_else(|| Skip::new("text box has no text"))?;
        let frame = Frame::new(
            Some(self.background_color),
            Some(Stroke::solid(self.border_color, 1.0)),
            12.0,
            8.0,
        );
        Ok(vec![
            Element::Spacer(10.0),
            frame.wrap(vec![Paragraph::new(text, &ctx.sheet.normal).into()]),
            Element::Spacer(10.0),
        ])
    }
}

// ============================================================================
// CALLOUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalloutKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl CalloutKind {
    pub fn name(self) -> &'static str {
        match self {
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Success => "success",
            CalloutKind::Error => "error",
        }
    }

    /// `(fill, border)`
    pub fn colors(self) -> (Color, Color) {
        match self {
            CalloutKind::Info => (Color::from_u32(0xE3F2FD), Color::from_u32(0x2196F3)),
            CalloutKind::Warning => (Color::from_u32(0xFFF3E0), Color::from_u32(0xFF9800)),
            CalloutKind::Success => (Color::from_u32(0xE8F5E8), Color::from_u32(0x4CAF50)),
            CalloutKind::Error => (Color::from_u32(0xFFEBEE), Color::from_u32(0xF44336)),
        }
    }
}

impl FromStr for CalloutKind {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(CalloutKind::Info),
            "warning" => Ok(CalloutKind::Warning),
            "success" => Ok(CalloutKind::Success),
            "error" => Ok(CalloutKind::Error),
            other => Err(QuireError::InvalidConfig(format!("unknown callout type '{}'", other))),
        }
    }
}

impl Serialize for CalloutKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown kinds read as info.
impl<'de> Deserialize<'de> for CalloutKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|e| {
            log::warn!("{}, using info", e);
            CalloutKind::Info
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Callout {
    pub text: String,
    pub title: Option<String>,
    #[serde(rename = "callout_type", alias = "style")]
    pub kind: CalloutKind,
}

impl Callout {
    pub fn new(kind: CalloutKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
            kind,
        }
    }
}

impl ContentMeta for Callout {
    fn label() -> &'static str {
        "Callout"
    }
}

impl Process for Callout {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let text = non_blank(&self.text).ok_or_else(|| Skip::new("callout has no text"))?;
        let (fill, border) = self.kind.colors();

        let mut flow = Vec::new();
        if let Some(title) = self.title.as_deref().and_then(non_blank) {
            flow.push(Paragraph::plain(title, &ctx.sheet.normal.clone().bold()).into());
            flow.push(Element::Spacer(6.0));
        }
        flow.push(Paragraph::new(text, &ctx.sheet.normal).into());

        let frame = Frame::new(Some(fill), Some(Stroke::solid(border, 2.0)), 15.0, 10.0);
        Ok(vec![Element::Spacer(15.0), frame.wrap(flow), Element::Spacer(15.0)])
    }
}

// ============================================================================
// PRIMITIVE WRAPPERS
// ============================================================================

fn default_dashboard_columns() -> usize {
    2
}

/// KPI tiles on a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "kpis")]
    pub metrics: Vec<KpiSpec>,
    #[serde(default = "default_dashboard_columns")]
    pub columns: usize,
}

impl Dashboard {
    pub fn new(metrics: Vec<KpiSpec>) -> Self {
        Self {
            title: String::new(),
            metrics,
            columns: default_dashboard_columns(),
        }
    }
}

impl ContentMeta for Dashboard {
    fn label() -> &'static str {
        "Dashboard"
    }
}

impl Process for Dashboard {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.metrics.is_empty() {
            return Err(Skip::new("dashboard has no metrics"));
        }
        let mut out = Vec::new();
        if let Some(title) = non_blank(&self.title) {
            out.extend(titled(title));
        }
        let grid = DashboardGrid::new(self.metrics.clone(), self.columns, &ctx.sheet.palette);
        out.push(Element::Primitive(grid.into()));
        out.push(Element::Spacer(20.0));
        Ok(out)
    }
}

/// A labelled progress bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressContent {
    pub percentage: f32,
    pub label: String,
    pub color: Option<Color>,
}

impl ContentMeta for ProgressContent {
    fn label() -> &'static str {
        "Progress"
    }
}

impl Process for ProgressContent {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let bar = ProgressBar::new(self.percentage).color(self.color.unwrap_or(ctx.sheet.palette.primary));
        let mut group = Vec::new();
        if let Some(label) = non_blank(&self.label) {
            group.push(Paragraph::new(label, &ctx.sheet.normal).into());
        }
        group.push(Element::Primitive(bar.into()));
        Ok(vec![Element::KeepTogether(group), Element::Spacer(12.0)])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineContent {
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

impl ContentMeta for TimelineContent {
    fn label() -> &'static str {
        "Timeline"
    }
}

impl Process for TimelineContent {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.events.is_empty() {
            return Err(Skip::new("timeline has no events"));
        }
        let mut out = Vec::new();
        if let Some(title) = non_blank(&self.title) {
            out.extend(titled(title));
        }
        let mut timeline = Timeline::new(self.events.clone());
        timeline.dot_color = ctx.sheet.palette.primary;
        out.push(Element::Primitive(timeline.into()));
        out.push(Element::Spacer(15.0));
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoBoxContent {
    #[serde(alias = "text")]
    pub content: String,
    #[serde(rename = "box_type", alias = "style")]
    pub kind: InfoKind,
}

impl ContentMeta for InfoBoxContent {
    fn label() -> &'static str {
        "Info Box"
    }
}

impl Process for InfoBoxContent {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let content = non_blank(&self.content).ok_or_else(|| Skip::new("info box has no content"))?;
        Ok(vec![
            Element::Primitive(InfoBox::new(content, self.kind).into()),
            Element::Spacer(12.0),
        ])
    }
}

// ============================================================================
// DATA SUMMARY
// ============================================================================

/// Descriptive statistics of a list or map, one line each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSummary {
    pub title: String,
    pub data: Value,
}

impl ContentMeta for DataSummary {
    fn label() -> &'static str {
        "Data Summary"
    }
}

impl Process for DataSummary {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        if self.data.is_null() {
            return Err(Skip::new("no data to summarize"));
        }
        let mut lines = summary_lines(&self.data).into_iter();
        let heading = lines.next().unwrap_or_default();
        let heading = non_blank(&self.title).map(str::to_string).unwrap_or(heading);

        let normal = &ctx.sheet.normal;
        let mut out = vec![
            Element::Spacer(12.0),
            Paragraph::plain(&heading, &normal.clone().bold()).into(),
        ];
        out.extend(lines.map(|line| Paragraph::plain(&line, normal).into()));
        out.push(Element::Spacer(12.0));
        Ok(out)
    }
}
