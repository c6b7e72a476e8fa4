//! # Documents
//!
//! A [`Document`] is a title, ordered metadata and a list of typed sections.
//! Building it assembles one story:
//!
//! ```text
//!   title page ─▶ table of contents ─▶ section 1 ─▶ section 2 ─▶ ...
//! ```
//!
//! then paginates the story, paints page furniture and writes the PDF.
//!
//! ```no_run
//! use quire::config::DocumentConfig;
//! use quire::document::{Document, SectionKind, SectionOptions};
//! use serde_json::json;
//!
//! let mut doc = Document::new(DocumentConfig::default()).title("Quarterly Review");
//! doc.append_section("Summary", json!("Revenue grew **12%**."), SectionKind::Text, SectionOptions::default());
//! doc.add_table(json!([["North", 120], ["South", 95]]), "Regions", Some(vec!["Region".into(), "Units".into()]));
//! let report = doc.build("review.pdf")?;
//! println!("{} pages", report.pages);
//! # Ok::<(), quire::error::QuireError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::canvas::pdf::{DocInfo, render_pdf};
use crate::chart::{ChartKind, ChartSpec};
use crate::config::{DocumentConfig, INCH};
use crate::content::{Content, Dashboard, ImageContent, TablePreset, Text, append};
use crate::context::RenderContext;
use crate::decoration::DecorationPipeline;
use crate::element::{Element, Paragraph, Role};
use crate::error::QuireError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::layout::paginate;
use crate::output::OutputDirs;
use crate::story::Story;
use crate::style::StyleSheet;

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionKind {
    #[default]
    Text,
    Table,
    Chart,
    Image,
    Dashboard,
}

impl SectionKind {
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Text => "text",
            SectionKind::Table => "table",
            SectionKind::Chart => "chart",
            SectionKind::Image => "image",
            SectionKind::Dashboard => "dashboard",
        }
    }
}

impl Serialize for SectionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown section types render their content as text.
impl<'de> Deserialize<'de> for SectionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "table" => SectionKind::Table,
            "chart" => SectionKind::Chart,
            "image" => SectionKind::Image,
            "dashboard" => SectionKind::Dashboard,
            "text" => SectionKind::Text,
            other => {
                log::warn!("unknown section type '{}', treating as text", other);
                SectionKind::Text
            }
        })
    }
}

fn default_level() -> u8 {
    1
}

/// Per-section knobs. Only the ones that apply to the section's kind are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    /// Table-of-contents depth, 1 at the top.
    #[serde(default = "default_level")]
    pub level: u8,
    pub chart_type: ChartKind,
    pub caption: Option<String>,
    pub headers: Option<Vec<String>>,
    pub preset: Option<TablePreset>,
    pub show_summary: bool,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            level: default_level(),
            chart_type: ChartKind::Auto,
            caption: None,
            headers: None,
            preset: None,
            show_summary: false,
            width: None,
            height: None,
        }
    }
}

/// One appended section. `id` is its zero-based append position.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: usize,
    pub title: String,
    pub content: Value,
    pub kind: SectionKind,
    pub options: SectionOptions,
}

impl Section {
    /// The content record this section's body is rendered through.
    pub fn content_record(&self) -> Result<Content, QuireError> {
        let record = match self.kind {
            SectionKind::Text => Content::Text(Text {
                text: value_text(&self.content),
            }),
            SectionKind::Table => {
                let (data, headers) = match &self.content {
                    Value::Object(map) => (
                        map.get("data").cloned().unwrap_or(Value::Null),
                        map.get("headers").cloned(),
                    ),
                    other => (other.clone(), None),
                };
                let mut table: crate::content::TableContent =
                    serde_json::from_value(serde_json::json!({ "data": data }))?;
                table.headers = match headers.filter(|h| !h.is_null()) {
                    Some(h) => Some(serde_json::from_value(h)?),
                    None => self.options.headers.clone(),
                };
                table.preset = self.options.preset;
                Content::Table(table)
            }
            SectionKind::Chart => {
                let mut spec = ChartSpec::new(self.options.chart_type, self.title.clone(), self.content.clone());
                spec.caption = self.options.caption.clone();
                spec.show_summary = self.options.show_summary;
                Content::Chart(spec)
            }
            SectionKind::Image => {
                let (source, caption) = match &self.content {
                    Value::Object(map) => (
                        map.get("source").map(value_text).unwrap_or_default(),
                        map.get("caption").map(value_text).filter(|c| !c.is_empty()),
                    ),
                    other => (value_text(other), None),
                };
                let mut image = ImageContent::from_source(source);
                image.width = self.options.width.unwrap_or(4.0 * INCH);
                image.height = self.options.height.unwrap_or(3.0 * INCH);
                image.alignment = crate::content::ImagePosition::Center;
                image.caption = caption.or_else(|| self.options.caption.clone());
                Content::Image(image)
            }
            SectionKind::Dashboard => {
                let widgets = match &self.content {
                    Value::Object(map) => map.get("widgets").cloned().unwrap_or(Value::Null),
                    other => other.clone(),
                };
                let widgets = if widgets.is_null() { Value::Array(Vec::new()) } else { widgets };
                Content::Dashboard(Dashboard::new(serde_json::from_value(widgets)?))
            }
        };
        Ok(record)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub level: u8,
}

// ============================================================================
// BUILD RESULTS
// ============================================================================

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub pages: usize,
    pub components_used: Vec<String>,
}

/// The outcome handed to callers at the top level. Entry points return
/// this instead of `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildResult {
    Success {
        output_path: PathBuf,
        size_bytes: u64,
        pages: usize,
        components_used: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success { .. })
    }

    pub fn error(message: impl Into<String>) -> Self {
        BuildResult::Error {
            message: message.into(),
        }
    }
}

impl From<Result<BuildReport, QuireError>> for BuildResult {
    fn from(result: Result<BuildReport, QuireError>) -> Self {
        match result {
            Ok(report) => BuildResult::Success {
                output_path: report.output_path,
                size_bytes: report.size_bytes,
                pages: report.pages,
                components_used: report.components_used,
            },
            Err(e) => {
                log::error!("Error generating PDF: {}", e);
                BuildResult::error(e.to_string())
            }
        }
    }
}

/// A story rendered in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Decoration steps that were painted, in order.
    pub decorations: Vec<&'static str>,
}

/// What [`write_story`] put on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Written {
    pub size_bytes: u64,
    pub pages: usize,
    pub decorations: Vec<&'static str>,
}

/// Paginate `story`, paint furniture and encode the PDF.
pub fn render_story(
    story: Story,
    config: &DocumentConfig,
    fetcher: &dyn Fetch,
    info: &DocInfo,
) -> Result<Rendered, QuireError> {
    let decorations = DecorationPipeline::new(config, fetcher);
    let pagination = paginate(story.into_elements(), &config.layout, &decorations)?;
    if pagination.overflowed > 0 {
        log::warn!("{} element(s) overflowed their frame", pagination.overflowed);
    }
    Ok(Rendered {
        bytes: render_pdf(&pagination.pages, info)?,
        pages: pagination.pages.len(),
        decorations: decorations.names(),
    })
}

/// Write finished PDF bytes to `path`, creating parent directories. A
/// partial file is removed if the write fails.
pub fn save_pdf(bytes: &[u8], path: &Path) -> Result<u64, QuireError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if let Err(e) = fs::write(path, bytes) {
        if path.exists() {
            if let Err(rm) = fs::remove_file(path) {
                log::warn!("could not remove partial file {}: {}", path.display(), rm);
            }
        }
        return Err(e.into());
    }
    Ok(bytes.len() as u64)
}

/// [`render_story`], then [`save_pdf`].
pub fn write_story(
    story: Story,
    config: &DocumentConfig,
    fetcher: &dyn Fetch,
    info: &DocInfo,
    path: &Path,
) -> Result<Written, QuireError> {
    let rendered = render_story(story, config, fetcher, info)?;
    let size_bytes = save_pdf(&rendered.bytes, path)?;
    log::info!("PDF written to {} ({} bytes, {} pages)", path.display(), size_bytes, rendered.pages);
    Ok(Written {
        size_bytes,
        pages: rendered.pages,
        decorations: rendered.decorations,
    })
}

// ============================================================================
// DOCUMENT
// ============================================================================

pub struct Document {
    pub config: DocumentConfig,
    pub title: String,
    pub metadata: Vec<(String, String)>,
    sections: Vec<Section>,
    toc: Vec<TocEntry>,
    output: OutputDirs,
    fetcher: Option<Box<dyn Fetch>>,
}

impl Document {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            title: String::new(),
            metadata: Vec::new(),
            sections: Vec::new(),
            toc: Vec::new(),
            output: OutputDirs::default(),
            fetcher: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Where charts and downloaded images are kept.
    pub fn with_output(mut self, output: OutputDirs) -> Self {
        self.output = output;
        self
    }

    /// Fetcher for remote images; an [`HttpFetcher`] is created at build
    /// time when none is given.
    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn append_section(
        &mut self,
        title: impl Into<String>,
        content: Value,
        kind: SectionKind,
        options: SectionOptions,
    ) -> &Section {
        let title = title.into();
        let id = self.sections.len();
        if self.config.table_of_contents {
            self.toc.push(TocEntry {
                title: title.clone(),
                level: options.level.max(1),
            });
        }
        self.sections.push(Section {
            id,
            title,
            content,
            kind,
            options,
        });
        &self.sections[id]
    }

    pub fn add_chart(&mut self, data: Value, kind: ChartKind, title: &str) -> &Section {
        let options = SectionOptions {
            chart_type: kind,
            ..Default::default()
        };
        self.append_section(or_default(title, "Chart"), data, SectionKind::Chart, options)
    }

    pub fn add_table(&mut self, data: Value, title: &str, headers: Option<Vec<String>>) -> &Section {
        let options = SectionOptions {
            headers,
            ..Default::default()
        };
        self.append_section(or_default(title, "Table"), data, SectionKind::Table, options)
    }

    pub fn add_image(&mut self, source: &str, title: &str, caption: &str) -> &Section {
        let content = serde_json::json!({ "source": source, "caption": caption });
        self.append_section(or_default(title, "Image"), content, SectionKind::Image, SectionOptions::default())
    }

    pub fn add_dashboard(&mut self, widgets: Value, title: &str) -> &Section {
        let content = serde_json::json!({ "widgets": widgets });
        self.append_section(or_default(title, "Dashboard"), content, SectionKind::Dashboard, SectionOptions::default())
    }

    fn title_page(&self, sheet: &StyleSheet) -> Vec<Element> {
        let mut out = vec![
            Element::Spacer(2.0 * INCH),
            Paragraph::new(&self.title, &sheet.doc_title).role(Role::Title).into(),
            Element::Spacer(0.5 * INCH),
        ];
        for (key, value) in &self.metadata {
            out.push(Paragraph::new(&format!("**{}:** {}", key, value), &sheet.normal).into());
        }
        out.push(Element::Spacer(INCH));
        let generated = format!("Generated on {}", Local::now().format("%B %d, %Y"));
        out.push(Paragraph::plain(&generated, &sheet.normal).into());
        out.push(Element::PageBreak);
        out
    }

    fn toc_page(&self, sheet: &StyleSheet) -> Vec<Element> {
        let mut out = vec![
            Paragraph::plain("Table of Contents", &sheet.heading1).role(Role::Heading(1)).into(),
            Element::Spacer(0.3 * INCH),
        ];
        for entry in &self.toc {
            let mut style = sheet.normal.clone();
            style.left_indent = 20.0 * f32::from(entry.level.saturating_sub(1));
            out.push(Paragraph::plain(&entry.title, &style).into());
        }
        out.push(Element::PageBreak);
        out
    }

    fn section_elements(&self, section: &Section, ctx: &RenderContext, story: &mut Story) {
        if !section.title.trim().is_empty() {
            let heading = if self.config.section_numbering {
                format!("{}. {}", section.id + 1, section.title)
            } else {
                section.title.clone()
            };
            story.push(Paragraph::new(&heading, &ctx.sheet.heading2).role(Role::Heading(2)).into());
            story.push(Element::Spacer(12.0));
        }

        match section.content_record() {
            Ok(record) => {
                append(story, &record, ctx);
            }
            Err(e) => {
                log::warn!("Error processing section {}: {}", section.title, e);
                let notice = format!("Error processing content: {}", e);
                story.push(Paragraph::plain(&notice, &ctx.sheet.normal).into());
            }
        }
        story.push(Element::Spacer(20.0));
    }

    /// The full story: title page, table of contents, then every section.
    pub fn story(&self, ctx: &RenderContext) -> Story {
        let mut story = Story::new();
        if !self.title.trim().is_empty() {
            story.extend(self.title_page(ctx.sheet));
        }
        if self.config.table_of_contents && !self.toc.is_empty() {
            story.extend(self.toc_page(ctx.sheet));
        }
        let last = self.sections.len().saturating_sub(1);
        for section in &self.sections {
            self.section_elements(section, ctx, &mut story);
            if self.config.page_breaks_before_sections && section.id != last {
                story.push_page_break();
            }
        }
        story
    }

    fn components_used(&self, decorations: &[&str]) -> Vec<String> {
        let mut used = Vec::new();
        if !self.title.trim().is_empty() {
            used.push("title_page".to_string());
        }
        if self.config.table_of_contents && !self.toc.is_empty() {
            used.push("table_of_contents".to_string());
        }
        for kind in [
            SectionKind::Text,
            SectionKind::Table,
            SectionKind::Chart,
            SectionKind::Image,
            SectionKind::Dashboard,
        ] {
            let n = self.sections.iter().filter(|s| s.kind == kind).count();
            if n > 0 {
                used.push(format!("{} sections ({})", kind.name(), n));
            }
        }
        used.extend(decorations.iter().map(|d| d.to_string()));
        used
    }

    fn rendered(&self) -> Result<Rendered, QuireError> {
        let owned;
        let fetcher: &dyn Fetch = match &self.fetcher {
            Some(f) => f.as_ref(),
            None => {
                owned = HttpFetcher::new()?;
                &owned
            }
        };

        let sheet = StyleSheet::resolve(&self.config);
        let ctx = RenderContext::new(&self.config, &sheet, fetcher, &self.output);
        let story = self.story(&ctx);
        log::debug!("story has {} elements, {} breaks", story.content_len(), story.break_count());

        let info = DocInfo {
            title: Some(self.title.clone()).filter(|t| !t.trim().is_empty()),
            author: self
                .metadata
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("author"))
                .map(|(_, v)| v.clone()),
            subject: None,
        };
        render_story(story, &self.config, fetcher, &info)
    }

    /// The finished PDF as bytes, without touching the filesystem beyond
    /// chart and image artifacts.
    pub fn render(&self) -> Result<Vec<u8>, QuireError> {
        Ok(self.rendered()?.bytes)
    }

    pub fn build(&self, path: impl AsRef<Path>) -> Result<BuildReport, QuireError> {
        let path = path.as_ref();
        let rendered = self.rendered()?;
        let size_bytes = save_pdf(&rendered.bytes, path)?;
        log::info!("PDF written to {} ({} bytes, {} pages)", path.display(), size_bytes, rendered.pages);

        Ok(BuildReport {
            output_path: path.to_path_buf(),
            size_bytes,
            pages: rendered.pages,
            components_used: self.components_used(&rendered.decorations),
        })
    }
}

fn or_default<'a>(title: &'a str, fallback: &'a str) -> &'a str {
    if title.trim().is_empty() { fallback } else { title }
}

// ============================================================================
// REQUESTS
// ============================================================================

fn default_section_title() -> String {
    "Untitled".into()
}

/// A section as it appears in a JSON document request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    #[serde(default = "default_section_title")]
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, rename = "type")]
    pub kind: SectionKind,
    #[serde(default)]
    pub options: SectionOptions,
}

/// A whole document as JSON: configuration, title, metadata and sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRequest {
    /// Named preset applied before `config`; see [`crate::presets`].
    pub preset: Option<String>,
    pub config: Option<DocumentConfig>,
    pub title: String,
    pub metadata: Map<String, Value>,
    /// Malformed entries are skipped with a warning.
    pub sections: Vec<Value>,
}

impl DocumentRequest {
    pub fn into_document(self) -> Document {
        let config = match (self.config, self.preset.as_deref()) {
            (Some(config), _) => config,
            (None, Some(name)) => crate::presets::preset_config(name),
            (None, None) => DocumentConfig::default(),
        };
        let mut doc = Document::new(config).title(self.title);
        for (key, value) in &self.metadata {
            doc.metadata.push((key.clone(), value_text(value)));
        }
        for (i, raw) in self.sections.into_iter().enumerate() {
            match serde_json::from_value::<SectionSpec>(raw) {
                Ok(spec) => {
                    doc.append_section(spec.title, spec.content, spec.kind, spec.options);
                }
                Err(e) => log::warn!("skipping malformed section {}: {}", i, e),
            }
        }
        doc
    }
}
