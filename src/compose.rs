//! # Compose requests
//!
//! One request that can carry every kind of content at once. Components are
//! laid down in a fixed order regardless of the order they appear in the
//! JSON:
//!
//! ```text
//!   cover → title → headings → charts → tables → images → formatted
//!   → lists → colored → additional content → signature → footnotes
//!   → endnotes → form → appendix → page breaks → sections → summary
//!   → multi-column → text boxes → callouts → QR codes
//! ```
//!
//! Each list entry is parsed on its own: a malformed entry is skipped with a
//! warning and the rest still render. Only an invalid watermark aborts the
//! request, before anything is written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::canvas::pdf::DocInfo;
use crate::chart::ChartSpec;
use crate::config::{BackgroundConfig, BorderConfig, DocumentConfig, FooterConfig, HAlign, HeaderConfig, Margins, WatermarkConfig};
use crate::content::{
    self, Appendix, AppendixSection, Callout, ColoredItem, ColoredText, Content, CoverPage, Endnotes, ExecutiveSummary,
    FormField, FormFields, FormattedItem, FormattedText, Footnotes, Heading, ImageContent, ListContent, MultiColumn,
    Note, QrCode, Signature, TableContent, TextBox, parse_each, parse_one,
};
use crate::context::RenderContext;
use crate::document::{BuildReport, BuildResult, write_story};
use crate::element::{Element, Paragraph, Role};
use crate::error::QuireError;
use crate::fetch::Fetch;
use crate::output::{OutputDirs, OutputKind};
use crate::story::{Block, BreakOptions, BreakPolicy, Story, split_into_sections};
use crate::style::{StyleSheet, TextStyle};
use crate::text::Font;

/// Page margin before any border allowance.
const BASE_MARGIN: f32 = 40.0;
/// Extra room kept between a border and the body.
const BORDER_PADDING: f32 = 5.0;

fn default_filename() -> String {
    "document.pdf".to_string()
}

/// Everything a compose request may carry. Lists hold raw records so each
/// entry can fail on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeRequest {
    /// Only the file name is used; the PDF lands in the output `pdfs/` dir.
    pub filename: String,
    pub title: String,
    #[serde(alias = "headings_content", deserialize_with = "entries")]
    pub headings: Vec<Value>,
    #[serde(alias = "colored_content", deserialize_with = "entries")]
    pub colored: Vec<Value>,
    #[serde(alias = "watermark_config")]
    pub watermark: Option<Value>,
    #[serde(alias = "signature_config")]
    pub signature: Option<Value>,
    #[serde(alias = "tables_config", deserialize_with = "entries")]
    pub tables: Vec<Value>,
    #[serde(alias = "images_config", deserialize_with = "entries")]
    pub images: Vec<Value>,
    #[serde(alias = "formatted_content", deserialize_with = "entries")]
    pub formatted: Vec<Value>,
    #[serde(alias = "lists_config", deserialize_with = "entries")]
    pub lists: Vec<Value>,
    #[serde(alias = "charts_config", deserialize_with = "entries")]
    pub charts: Vec<Value>,
    #[serde(alias = "header_config")]
    pub header: Option<Value>,
    #[serde(alias = "footer_config")]
    pub footer: Option<Value>,
    pub additional_content: String,
    #[serde(alias = "cover_config")]
    pub cover: Option<Value>,
    #[serde(alias = "summary_config")]
    pub summary: Option<Value>,
    #[serde(alias = "footnotes_config", deserialize_with = "entries")]
    pub footnotes: Vec<Value>,
    #[serde(alias = "endnotes_config", deserialize_with = "entries")]
    pub endnotes: Vec<Value>,
    #[serde(alias = "form_config", deserialize_with = "entries")]
    pub form: Vec<Value>,
    #[serde(alias = "appendix_config", deserialize_with = "entries")]
    pub appendix: Vec<Value>,
    /// Indices into the story built so far, breaks included.
    #[serde(alias = "page_breaks_config")]
    pub page_breaks: Option<Value>,
    /// A [`BreakPolicy`] record.
    #[serde(alias = "break_policy_config")]
    pub break_policy: Option<Value>,
    /// A list of blocks, each a string or a list of strings.
    #[serde(alias = "sections_config")]
    pub sections: Option<Value>,
    /// A [`BreakOptions`] record for `sections`.
    pub section_options: Option<Value>,
    #[serde(alias = "multi_column_config", deserialize_with = "entries")]
    pub multi_column: Vec<Value>,
    #[serde(alias = "textbox_config", deserialize_with = "entries")]
    pub textbox: Vec<Value>,
    #[serde(alias = "callout_config", deserialize_with = "entries")]
    pub callout: Vec<Value>,
    #[serde(alias = "qr_config", deserialize_with = "entries")]
    pub qr: Vec<Value>,
    #[serde(alias = "background_config")]
    pub background: Option<Value>,
    #[serde(alias = "border_config")]
    pub border: Option<Value>,
}

impl Default for ComposeRequest {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            title: String::new(),
            headings: Vec::new(),
            colored: Vec::new(),
            watermark: None,
            signature: None,
            tables: Vec::new(),
            images: Vec::new(),
            formatted: Vec::new(),
            lists: Vec::new(),
            charts: Vec::new(),
            header: None,
            footer: None,
            additional_content: String::new(),
            cover: None,
            summary: None,
            footnotes: Vec::new(),
            endnotes: Vec::new(),
            form: Vec::new(),
            appendix: Vec::new(),
            page_breaks: None,
            break_policy: None,
            sections: None,
            section_options: None,
            multi_column: Vec::new(),
            textbox: Vec::new(),
            callout: Vec::new(),
            qr: Vec::new(),
            background: None,
            border: None,
        }
    }
}

/// A list of raw entries. Anything else is ignored with a warning.
fn entries<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Value>, D::Error> {
    match Value::deserialize(de)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => {
            log::warn!("expected a list of entries, got {}, ignoring", other);
            Ok(Vec::new())
        }
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

impl ComposeRequest {
    /// Page configuration for this request. Fails only on an invalid
    /// watermark; other malformed decorations are dropped with a warning.
    pub fn config(&self) -> Result<DocumentConfig, QuireError> {
        let mut config = DocumentConfig::default();
        if let Some(raw) = present(&self.watermark) {
            config.watermark = Some(WatermarkConfig::from_value(raw)?);
        }
        config.header = parse_one::<HeaderConfig>(self.header.as_ref(), "header");
        config.footer = parse_one::<FooterConfig>(self.footer.as_ref(), "footer");
        config.background = parse_one::<BackgroundConfig>(self.background.as_ref(), "background");
        config.border = parse_one::<BorderConfig>(self.border.as_ref(), "border");

        let allowance = config.border.as_ref().map_or(0.0, |b| b.margin() + BORDER_PADDING);
        config.layout.margins = Margins::uniform(BASE_MARGIN + allowance);
        config.validate()?;
        Ok(config)
    }

    /// Assemble the story in the fixed component order.
    pub fn story(&self, ctx: &RenderContext) -> Story {
        let mut story = Story::new();
        let add = |story: &mut Story, content: Content| {
            content::append(story, &content, ctx);
        };

        if let Some(cover) = parse_one::<CoverPage>(self.cover.as_ref(), "cover") {
            add(&mut story, cover.into());
        }
        if let Some(title) = content::non_blank(&self.title) {
            let style = TextStyle::new(Font::HelveticaBold, 20.0)
                .leading(24.0)
                .spacing(0.0, 30.0)
                .align(HAlign::Center);
            story.push(Paragraph::new(title, &style).role(Role::Title).into());
            story.push(Element::Spacer(30.0));
        }
        for heading in parse_each::<Heading>(&self.headings, "heading") {
            add(&mut story, heading.into());
        }
        for chart in parse_each::<ChartSpec>(&self.charts, "chart") {
            add(&mut story, chart.into());
        }
        for table in parse_each::<TableContent>(&self.tables, "table") {
            add(&mut story, table.into());
        }
        for image in parse_each::<ImageContent>(&self.images, "image") {
            add(&mut story, image.into());
        }
        if !self.formatted.is_empty() {
            let items = parse_each::<FormattedItem>(&self.formatted, "formatted text");
            add(&mut story, FormattedText { items }.into());
        }
        for list in parse_each::<ListContent>(&self.lists, "list") {
            add(&mut story, list.into());
        }
        if !self.colored.is_empty() {
            let items = parse_each::<ColoredItem>(&self.colored, "colored text");
            add(
                &mut story,
                ColoredText {
                    items,
                    ..Default::default()
                }
                .into(),
            );
        }
        if let Some(text) = content::non_blank(&self.additional_content) {
            let body = TextStyle::new(Font::Helvetica, 11.0).leading(14.0).spacing(5.0, 15.0);
            story.push(Element::Spacer(20.0));
            story.push(Paragraph::plain("Executive Summary:", &ctx.sheet.normal.clone().bold()).into());
            story.push(Element::Spacer(10.0));
            story.push(Paragraph::new(text, &body).into());
        }
        if let Some(signature) = parse_one::<Signature>(self.signature.as_ref(), "signature") {
            add(&mut story, signature.into());
        }
        if !self.footnotes.is_empty() {
            let notes = parse_each::<Note>(&self.footnotes, "footnote");
            add(&mut story, Footnotes { notes }.into());
        }
        if !self.endnotes.is_empty() {
            let notes = parse_each::<Note>(&self.endnotes, "endnote");
            add(&mut story, Endnotes { notes }.into());
        }
        if !self.form.is_empty() {
            let fields = parse_each::<FormField>(&self.form, "form field");
            add(&mut story, FormFields { fields }.into());
        }
        if !self.appendix.is_empty() {
            let sections = parse_each::<AppendixSection>(&self.appendix, "appendix section");
            add(&mut story, Appendix { sections }.into());
        }
        if let Some(indices) = present(&self.page_breaks) {
            let n = story.insert_page_breaks_value(indices);
            log::debug!("inserted {} requested page breaks", n);
        }
        if let Some(policy) = parse_one::<BreakPolicy>(self.break_policy.as_ref(), "break policy") {
            let n = story.apply_break_policy(&policy);
            log::debug!("break policy inserted {} page breaks", n);
        }
        if let Some(blocks) = present(&self.sections).and_then(Block::list_from_value) {
            let options = parse_one::<BreakOptions>(self.section_options.as_ref(), "section options").unwrap_or_default();
            split_into_sections(&mut story, blocks, &options, ctx.sheet);
        }
        if let Some(summary) = parse_one::<ExecutiveSummary>(self.summary.as_ref(), "summary") {
            add(&mut story, summary.into());
        }
        for columns in parse_each::<MultiColumn>(&self.multi_column, "multi-column block") {
            add(&mut story, columns.into());
        }
        for text_box in parse_each::<TextBox>(&self.textbox, "text box") {
            add(&mut story, text_box.into());
        }
        for callout in parse_each::<Callout>(&self.callout, "callout") {
            add(&mut story, callout.into());
        }
        for qr in parse_each::<QrCode>(&self.qr, "QR code") {
            add(&mut story, qr.into());
        }
        story
    }

    /// Labels for every component the request asked for, counting raw
    /// entries.
    pub fn components_used(&self, config: &DocumentConfig) -> Vec<String> {
        let mut used = Vec::new();
        let flag = |used: &mut Vec<String>, on: bool, label: &str| {
            if on {
                used.push(label.to_string());
            }
        };
        let count = |used: &mut Vec<String>, items: &[Value], label: &str| {
            if !items.is_empty() {
                used.push(format!("{} ({})", label, items.len()));
            }
        };

        flag(&mut used, !self.title.trim().is_empty(), "title");
        count(&mut used, &self.headings, "headings");
        count(&mut used, &self.charts, "charts");
        count(&mut used, &self.tables, "tables");
        count(&mut used, &self.images, "images");
        flag(&mut used, config.background.is_some(), "background");
        flag(&mut used, config.border.is_some(), "border");
        count(&mut used, &self.formatted, "formatted_text");
        count(&mut used, &self.lists, "lists");
        count(&mut used, &self.colored, "colored_text");
        if let Some(watermark) = &config.watermark {
            used.push(format!("watermark ({})", watermark.kind()));
        }
        flag(&mut used, present(&self.signature).is_some(), "signature");
        flag(&mut used, config.header.is_some(), "header");
        flag(&mut used, config.footer.is_some(), "footer");
        flag(&mut used, !self.additional_content.trim().is_empty(), "additional_content");
        flag(&mut used, !self.footnotes.is_empty(), "footnotes");
        flag(&mut used, !self.endnotes.is_empty(), "endnotes");
        flag(&mut used, !self.form.is_empty(), "form");
        flag(&mut used, !self.appendix.is_empty(), "appendix");
        flag(&mut used, present(&self.page_breaks).is_some(), "page_breaks");
        flag(&mut used, present(&self.break_policy).is_some(), "break_policy");
        flag(&mut used, present(&self.sections).is_some(), "sections");
        flag(&mut used, present(&self.cover).is_some(), "cover");
        count(&mut used, &self.multi_column, "multi_column");
        count(&mut used, &self.textbox, "textbox");
        count(&mut used, &self.callout, "callout");
        count(&mut used, &self.qr, "qr");
        flag(&mut used, present(&self.summary).is_some(), "summary");
        used
    }

    /// Where the PDF goes: the request's file name under `pdfs/`.
    pub fn output_path(&self, output: &OutputDirs) -> Result<PathBuf, QuireError> {
        let name = Path::new(self.filename.trim())
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| default_filename().into());
        Ok(output.dir(OutputKind::Pdfs)?.join(name))
    }

    /// Build the PDF. `path` overrides [`ComposeRequest::output_path`].
    pub fn build(&self, fetcher: &dyn Fetch, output: &OutputDirs, path: Option<&Path>) -> Result<BuildReport, QuireError> {
        let config = self.config()?;
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self.output_path(output)?,
        };

        let sheet = StyleSheet::resolve(&config);
        let ctx = RenderContext::new(&config, &sheet, fetcher, output);
        let story = self.story(&ctx);
        log::debug!("compose story has {} elements, {} breaks", story.content_len(), story.break_count());

        let info = DocInfo {
            title: content::non_blank(&self.title).map(str::to_string),
            author: None,
            subject: None,
        };
        let written = write_story(story, &config, fetcher, &info, &path)?;
        Ok(BuildReport {
            output_path: path,
            size_bytes: written.size_bytes,
            pages: written.pages,
            components_used: self.components_used(&config),
        })
    }
}

/// Run a compose request and fold the outcome into a [`BuildResult`].
pub fn compose(request: &ComposeRequest, fetcher: &dyn Fetch, output: &OutputDirs, path: Option<&Path>) -> BuildResult {
    match request.build(fetcher, output, path) {
        Err(QuireError::Validation(message)) => {
            log::error!("compose request rejected: {}", message);
            BuildResult::error(message)
        }
        other => other.into(),
    }
}

/// [`compose`] for raw JSON; a request that is not an object is an error
/// result.
pub fn compose_value(request: Value, fetcher: &dyn Fetch, output: &OutputDirs, path: Option<&Path>) -> BuildResult {
    match serde_json::from_value::<ComposeRequest>(request) {
        Ok(request) => compose(&request, fetcher, output, path),
        Err(e) => BuildResult::error(format!("invalid compose request: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(value: Value) -> ComposeRequest {
        serde_json::from_value(value).unwrap()
    }

    fn story_texts(req: &ComposeRequest) -> Vec<String> {
        let config = req.config().unwrap();
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        req.story(&ctx)
            .iter()
            .filter_map(|e| match e {
                Element::Paragraph(p) => Some(p.text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_watermark_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDirs::new(dir.path());
        let fetcher = MemoryFetcher::new();

        let result = compose_value(json!({"watermark": {"type": "text"}}), &fetcher, &output, None);
        assert_eq!(result, BuildResult::error("Text watermark requires text field"));
        let result = compose_value(json!({"watermark": {"type": "stamp"}}), &fetcher, &output, None);
        assert_eq!(result, BuildResult::error("Invalid watermark type"));
        assert!(!dir.path().join("pdfs").join("document.pdf").exists());

        let req = request(json!({"watermark": {"type": "image", "url": "http://x"}}));
        assert!(matches!(req.config().unwrap().watermark, Some(WatermarkConfig::Image { .. })));
    }

    #[test]
    fn test_fixed_component_order() {
        let req = request(json!({
            "qr": [{"data": "https://example.com"}],
            "additional_content": "Closing words.",
            "headings": [{"text": "Overview", "content": "Body"}],
            "title": "Annual Review"
        }));
        let texts = story_texts(&req);
        assert_eq!(
            texts,
            vec!["Annual Review", "Overview", "Body", "Executive Summary:", "Closing words."]
        );
    }

    #[test]
    fn test_bad_entries_skip_alone() {
        let req = request(json!({
            "headings": [{"text": "Good"}, {"level": "top"}, {"text": "Also good", "level": 2}],
            "lists": ["not a list", {"items": ["a", "b"], "list_type": "numbered"}]
        }));
        let texts = story_texts(&req);
        assert_eq!(texts, vec!["Good", "Also good", "1. a", "2. b"]);
    }

    #[test]
    fn test_malformed_break_options_do_not_sink_request() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDirs::new(dir.path());
        let fetcher = MemoryFetcher::new();
        let req = json!({
            "title": "T",
            "tables": {"data": [["x"]]},
            "break_policy": {"custom_positions": [1, "x"]},
            "sections": ["a", "b", "c"],
            "section_options": {"break_between_all": false, "break_after_indices": [0, "x"]}
        });
        let result = compose_value(req, &fetcher, &output, None);
        let BuildResult::Success { pages, components_used, .. } = result else {
            panic!("expected success, got {:?}", result);
        };
        // policy break after the title, then one after section "a"
        assert_eq!(pages, 3);
        assert_eq!(components_used, vec!["title", "break_policy", "sections"]);
    }

    #[test]
    fn test_non_list_entries_are_ignored() {
        let req = request(json!({"headings": {"text": "x"}, "lists": "a", "qr": null, "title": "Kept"}));
        assert!(req.headings.is_empty() && req.lists.is_empty() && req.qr.is_empty());
        assert_eq!(story_texts(&req), vec!["Kept"]);
    }

    #[test]
    fn test_page_break_indices_count_the_cover_break() {
        let req = request(json!({
            "cover": {"title": "Cover"},
            "headings": [{"text": "A"}, {"text": "B"}],
            "page_breaks": [3]
        }));
        let config = req.config().unwrap();
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        let story = req.story(&ctx);
        // [cover, |, A, B]: index 3 puts a break before B
        let kinds: Vec<&str> = story.iter().map(Element::kind).collect();
        assert_eq!(kinds, vec!["keep_together", "page_break", "paragraph", "page_break", "paragraph"]);
    }

    #[test]
    fn test_border_widens_margins() {
        let plain = request(json!({})).config().unwrap();
        assert_eq!(plain.layout.margins, Margins::uniform(40.0));
        let bordered = request(json!({"border": {"margin_inches": 0.5}})).config().unwrap();
        assert_eq!(bordered.layout.margins.left, 40.0 + 36.0 + 5.0);
    }

    #[test]
    fn test_components_used_labels() {
        let req = request(json!({
            "title": "T",
            "headings": [{"text": "a"}, {"text": "b"}],
            "tables": [{"data": [["x"]]}],
            "border": {},
            "watermark": {"type": "text", "text": "DRAFT"},
            "footer": {},
            "page_breaks": [1],
            "callout": [{"text": "note"}],
            "summary": {"title": "S"}
        }));
        let config = req.config().unwrap();
        assert_eq!(
            req.components_used(&config),
            vec![
                "title",
                "headings (2)",
                "tables (1)",
                "border",
                "watermark (text)",
                "footer",
                "page_breaks",
                "callout (1)",
                "summary"
            ]
        );
    }

    #[test]
    fn test_build_writes_into_pdfs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDirs::new(dir.path());
        let fetcher = MemoryFetcher::new();
        let req = request(json!({
            "filename": "../../escape/report.pdf",
            "title": "Report",
            "sections": ["First", ["Second", null, "More"]]
        }));
        let result = compose(&req, &fetcher, &output, None);
        let BuildResult::Success { output_path, pages, components_used, .. } = result else {
            panic!("expected success, got {:?}", result);
        };
        assert_eq!(output_path, dir.path().join("pdfs").join("report.pdf"));
        assert!(output_path.exists());
        assert_eq!(pages, 2);
        assert_eq!(components_used, vec!["title", "sections"]);
    }
}
