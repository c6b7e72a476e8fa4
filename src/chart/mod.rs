//! # Charts
//!
//! Charts are described by a [`ChartSpec`]: a kind, a title and a free-form
//! JSON data record. Building one rasterizes the plot to a PNG, keeps a copy
//! under the charts output directory, and returns the elements that embed it
//! in a story.
//!
//! ```text
//! ChartSpec ──classify (auto)──> ChartKind ──plots::render──> PNG
//!                                                   │
//!                                   OutputDirs::save + RasterImage
//!                                                   │
//!                   [Spacer, title, Spacer, Image, caption?, Spacer]
//! ```
//!
//! Kind `table` and data that classifies as tabular render as a table
//! instead. A chart that fails to render degrades to an italic notice; it
//! never aborts the surrounding document.

pub mod classify;
pub mod palette;
mod plots;
mod raster;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::canvas::RasterImage;
use crate::color::Color;
use crate::config::HAlign;
use crate::content::{Process, table};
use crate::context::RenderContext;
use crate::element::{Element, ImageBlock, Paragraph, Role};
use crate::error::{QuireError, Skip};
use crate::output::OutputKind;
use crate::style::TextStyle;
use crate::text::Font;

pub use classify::{Analysis, analyze, classify, summary_lines};
pub use plots::render;
pub(crate) use plots::label_text;

/// Size a chart image is embedded at, in points.
pub const EMBED_WIDTH: f32 = 500.0;
pub const EMBED_HEIGHT: f32 = 300.0;

// ============================================================================
// CHART KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    /// Pick a kind from the shape of the data.
    Auto,
    #[default]
    Bar,
    /// Horizontal bars.
    Hbar,
    Pie,
    Doughnut,
    Line,
    Histogram,
    Scatter,
    /// Not a plot: the data rendered as a table.
    Table,
}

impl ChartKind {
    pub const ALL: &'static [ChartKind] = &[
        ChartKind::Auto,
        ChartKind::Bar,
        ChartKind::Hbar,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Line,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Table,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Auto => "auto",
            ChartKind::Bar => "bar",
            ChartKind::Hbar => "hbar",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Line => "line",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Table => "table",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "column" => ChartKind::Bar,
            "horizontal_bar" | "barh" => ChartKind::Hbar,
            "donut" => ChartKind::Doughnut,
            other => ChartKind::ALL
                .iter()
                .copied()
                .find(|k| k.name() == other)
                .ok_or_else(|| QuireError::Chart(format!("unknown chart type '{}'", s)))?,
        };
        Ok(kind)
    }
}

impl Serialize for ChartKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// CHART REQUESTS
// ============================================================================

fn default_title() -> String {
    "Chart".into()
}

/// One chart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default, rename = "chart_type", alias = "type", alias = "kind")]
    pub kind: ChartKind,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub caption: Option<String>,
    /// Follow the chart with summary statistics of the data.
    #[serde(default)]
    pub show_summary: bool,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            kind: ChartKind::Bar,
            title: default_title(),
            data: Value::Null,
            caption: None,
            show_summary: false,
        }
    }
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>, data: Value) -> Self {
        Self {
            kind,
            title: title.into(),
            data,
            ..Default::default()
        }
    }

    fn has_data(&self) -> bool {
        match &self.data {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl Process for ChartSpec {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        build(self, ctx)
    }
}

/// Elements embedding the chart described by `spec`.
pub fn build(spec: &ChartSpec, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
    if !spec.has_data() {
        return Err(Skip::new(format!("chart '{}' has no data", spec.title)));
    }

    let mut title = spec.title.clone();
    let mut kind = spec.kind;
    if kind == ChartKind::Auto {
        let analysis = analyze(&spec.data);
        log::debug!("auto chart '{}': {} ({})", spec.title, analysis.kind, analysis.reason);
        kind = analysis.kind;
        if title.trim().is_empty() {
            title = format!("Data Visualization ({})", analysis.reason);
        }
    }
    let data = normalize(&spec.data);

    let mut out = match kind {
        ChartKind::Table => table_fallback(&title, &spec.data, ctx),
        _ => match embed(kind, &title, &data, spec.caption.as_deref(), ctx) {
            Ok(elements) => elements,
            Err(e) => {
                log::error!("Error creating {} chart: {}", kind, e);
                failure_notice(&title)
            }
        },
    };

    if spec.show_summary {
        out.push(Element::Spacer(12.0));
        out.extend(summary_paragraphs(&spec.data, ctx));
    }
    Ok(out)
}

fn title_style() -> TextStyle {
    TextStyle::new(Font::HelveticaBold, 12.0).leading(14.4)
}

fn embed(
    kind: ChartKind,
    title: &str,
    data: &Value,
    caption: Option<&str>,
    ctx: &RenderContext,
) -> Result<Vec<Element>, QuireError> {
    let png = render(kind, data)?;
    let path = ctx.output.save(OutputKind::Charts, &format!("{}_chart", kind), "png", &png)?;
    log::info!("chart '{}' saved to {}", title, path.display());
    let image = RasterImage::decode(path.to_string_lossy(), &png)?;

    let mut out = vec![
        Element::Spacer(20.0),
        Paragraph::plain(title, &title_style()).into(),
        Element::Spacer(10.0),
        ImageBlock::new(Arc::new(image), EMBED_WIDTH, EMBED_HEIGHT).into(),
    ];
    if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
        out.push(Element::Spacer(8.0));
        out.push(caption_paragraph(caption, HAlign::Left));
    }
    out.push(Element::Spacer(25.0));
    Ok(out)
}

/// Italic 9pt gray caption.
pub(crate) fn caption_paragraph(text: &str, align: HAlign) -> Element {
    let style = TextStyle::new(Font::HelveticaOblique, 9.0)
        .leading(11.0)
        .color(Color::from_u32(0x808080))
        .align(align);
    Paragraph::plain(text, &style).role(Role::Caption).into()
}

fn failure_notice(title: &str) -> Vec<Element> {
    let style = TextStyle::new(Font::HelveticaOblique, 10.0).leading(12.0);
    vec![
        Paragraph::plain(&format!("Chart '{}' could not be generated", title), &style).into(),
        Element::Spacer(16.0),
    ]
}

fn summary_paragraphs(data: &Value, ctx: &RenderContext) -> Vec<Element> {
    summary_lines(data)
        .iter()
        .map(|line| Paragraph::plain(line, &ctx.sheet.normal).into())
        .collect()
}

// ============================================================================
// AUTO DATA
// ============================================================================

/// Reshape bare data into the record the plot renderers read.
///
/// Numeric lists get `Item n` labels, string lists become counts in first
/// seen order, numeric maps become labels and values, and a map with a time
/// key plots its first numeric list against the dates. Records that already
/// carry `values` or `y` pass through.
fn normalize(data: &Value) -> Value {
    match data {
        Value::Array(items) if items.iter().all(Value::is_number) => {
            let labels: Vec<String> = (1..=items.len()).map(|i| format!("Item {}", i)).collect();
            json!({ "labels": labels, "values": items })
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let mut counts: Vec<(String, u64)> = Vec::new();
            for item in items.iter().map(plots::label_text) {
                match counts.iter_mut().find(|(label, _)| *label == item) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((item, 1)),
                }
            }
            let (labels, values): (Vec<String>, Vec<u64>) = counts.into_iter().unzip();
            json!({ "labels": labels, "values": values })
        }
        Value::Object(map) if map.contains_key("values") || map.contains_key("y") => data.clone(),
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_number) => {
            let labels: Vec<&String> = map.keys().collect();
            let values: Vec<&Value> = map.values().collect();
            json!({ "labels": labels, "values": values })
        }
        Value::Object(map) => time_series(map).unwrap_or_else(|| data.clone()),
        _ => data.clone(),
    }
}

fn time_series(map: &Map<String, Value>) -> Option<Value> {
    let x = map
        .iter()
        .find(|(k, _)| matches!(k.to_ascii_lowercase().as_str(), "date" | "time" | "timestamp"))
        .map(|(_, v)| v)?;
    let y = map
        .values()
        .find(|v| v.as_array().is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_number)))?;
    Some(json!({ "x": x, "y": y }))
}

// ============================================================================
// TABLE FALLBACK
// ============================================================================

/// Rows for data that does not plot: maps as key/value pairs, lists of
/// records with a header from their keys, other lists as numbered items.
fn table_rows(data: &Value) -> Vec<Vec<String>> {
    let cell = |v: &Value| match v {
        Value::Array(items) => items.iter().map(plots::label_text).collect::<Vec<_>>().join(", "),
        other => plots::label_text(other),
    };
    match data {
        Value::Object(map) => {
            let mut rows = vec![vec!["Key".to_string(), "Value".to_string()]];
            rows.extend(map.iter().map(|(k, v)| vec![k.clone(), cell(v)]));
            rows
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let mut header: Vec<String> = Vec::new();
            for item in items.iter().filter_map(Value::as_object) {
                for key in item.keys() {
                    if !header.contains(key) {
                        header.push(key.clone());
                    }
                }
            }
            let mut rows = vec![header.clone()];
            rows.extend(items.iter().map(|item| {
                header
                    .iter()
                    .map(|k| item.get(k).map(cell).unwrap_or_default())
                    .collect()
            }));
            rows
        }
        Value::Array(items) => {
            let mut rows = vec![vec!["#".to_string(), "Value".to_string()]];
            rows.extend(items.iter().enumerate().map(|(i, v)| vec![(i + 1).to_string(), cell(v)]));
            rows
        }
        other => vec![vec!["Value".to_string()], vec![cell(other)]],
    }
}

fn table_fallback(title: &str, data: &Value, ctx: &RenderContext) -> Vec<Element> {
    let rows = table_rows(data);
    let mut out = vec![
        Element::Spacer(20.0),
        Paragraph::plain(title, &title_style()).into(),
        Element::Spacer(10.0),
    ];
    out.push(table::preset_table(rows, table::TablePreset::Default, ctx).into());
    out.push(Element::Spacer(25.0));
    out
}
