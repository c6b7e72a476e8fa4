//! # Content Processors
//!
//! Declarative content records and the processors that turn them into
//! story elements. Each record is one JSON object tagged by `type`:
//!
//! ```json
//! {"type": "heading", "level": 2, "text": "Results"}
//! {"type": "chart", "chart_type": "pie", "data": {"labels": ["a"], "values": [1]}}
//! ```
//!
//! Every processor follows one contract, [`Process::process`]: it either
//! returns the elements to append or a [`Skip`] saying why it contributes
//! nothing. A skip is logged once by [`append`] and the document carries on.

mod boxes;
mod cover;
mod media;
mod notes;
pub mod table;
mod text;

pub use boxes::{
    Callout, CalloutKind, Dashboard, DataSummary, ExecutiveSummary, InfoBoxContent, MultiColumn, ProgressContent,
    TextBox, TimelineContent,
};
pub use cover::CoverPage;
pub use media::{ImageContent, ImagePosition, QrCode, Signature, SignaturePosition};
pub use notes::{Appendix, AppendixSection, Endnotes, FieldKind, FormField, FormFields, Footnotes, Note};
pub use table::{TableContent, TableLook, TablePreset};
pub use text::{ColoredItem, ColoredText, FormattedItem, FormattedText, Heading, ListContent, ListKind, Text};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chart::ChartSpec;
use crate::context::RenderContext;
use crate::element::Element;
use crate::error::Skip;
use crate::story::Story;

/// Turns one content record into story elements.
pub trait Process {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip>;
}

/// Per-kind metadata.
pub trait ContentMeta {
    /// Human-readable name (e.g. "Text Box").
    fn label() -> &'static str;
}

/// A vertical gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spacer {
    #[serde(default = "default_spacer_height")]
    pub height: f32,
}

fn default_spacer_height() -> f32 {
    12.0
}

impl ContentMeta for Spacer {
    fn label() -> &'static str {
        "Spacer"
    }
}

impl Process for Spacer {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        Ok(vec![Element::Spacer(self.height.max(0.0))])
    }
}

/// An explicit page break.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageBreak {}

impl ContentMeta for PageBreak {
    fn label() -> &'static str {
        "Page Break"
    }
}

impl Process for PageBreak {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        Ok(vec![Element::PageBreak])
    }
}

impl ContentMeta for ChartSpec {
    fn label() -> &'static str {
        "Chart"
    }
}

/// Define the Content enum and its dispatch from a single list.
///
/// Adding a content kind: add one line here, then give the record type a
/// [`Process`] and a [`ContentMeta`] impl.
macro_rules! define_content {
    ($($variant:ident($inner:ty)),+ $(,)?) => {
        /// Any content record, tagged by `type`.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        pub enum Content {
            $($variant($inner),)+
        }

        $(
            impl From<$inner> for Content {
                fn from(c: $inner) -> Self {
                    Content::$variant(c)
                }
            }
        )+

        impl Content {
            pub fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
                match self { $(Content::$variant(c) => c.process(ctx),)+ }
            }

            /// Human-readable label (from [`ContentMeta::label`]).
            pub fn label(&self) -> &'static str {
                match self { $(Content::$variant(_) => <$inner>::label(),)+ }
            }
        }
    };
}

define_content! {
    Heading(Heading),
    Text(Text),
    FormattedText(FormattedText),
    ColoredText(ColoredText),
    List(ListContent),
    Table(TableContent),
    Image(ImageContent),
    Chart(ChartSpec),
    Qr(QrCode),
    Signature(Signature),
    Cover(CoverPage),
    Summary(ExecutiveSummary),
    Footnotes(Footnotes),
    Endnotes(Endnotes),
    Form(FormFields),
    Appendix(Appendix),
    MultiColumn(MultiColumn),
    TextBox(TextBox),
    Callout(Callout),
    Dashboard(Dashboard),
    Progress(ProgressContent),
    Timeline(TimelineContent),
    InfoBox(InfoBoxContent),
    DataSummary(DataSummary),
    Spacer(Spacer),
    PageBreak(PageBreak),
}

/// Run `content` and append what it produced. Returns the number of
/// elements appended; a skip is logged and appends nothing.
pub fn append(story: &mut Story, content: &Content, ctx: &RenderContext) -> usize {
    match content.process(ctx) {
        Ok(elements) => {
            let n = elements.len();
            story.extend(elements);
            n
        }
        Err(skip) => {
            log::warn!("skipping {}: {}", content.label(), skip);
            0
        }
    }
}

/// Parse each of `items` on its own. A malformed entry is skipped with a
/// warning naming its position, so one bad record never sinks the rest.
pub fn parse_each<T: DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match T::deserialize(item) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("skipping malformed {} {}: {}", what, i, e);
                None
            }
        })
        .collect()
}

/// [`parse_each`] for a single optional record.
pub fn parse_one<T: DeserializeOwned>(item: Option<&Value>, what: &str) -> Option<T> {
    let item = item.filter(|v| !v.is_null())?;
    match T::deserialize(item) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("ignoring malformed {}: {}", what, e);
            None
        }
    }
}

/// Trimmed text, or `None` when blank.
pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::fetch::MemoryFetcher;
    use crate::output::OutputDirs;
    use crate::style::StyleSheet;
    use serde_json::json;

    #[test]
    fn test_tagged_records() {
        let c: Content = serde_json::from_value(json!({"type": "heading", "text": "Intro"})).unwrap();
        assert_eq!(c.label(), "Heading");
        let c: Content = serde_json::from_value(json!({"type": "text_box", "text": "boxed"})).unwrap();
        assert_eq!(c.label(), "Text Box");
        let c: Content = serde_json::from_value(json!({"type": "chart", "chart_type": "line", "data": [1]})).unwrap();
        assert!(matches!(c, Content::Chart(ref spec) if spec.kind == crate::chart::ChartKind::Line));
        assert!(serde_json::from_value::<Content>(json!({"type": "hologram"})).is_err());
    }

    #[test]
    fn test_append_logs_skip_and_adds_nothing() {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);

        let mut story = Story::new();
        let empty = Content::Signature(Signature {
            text: "  ".into(),
            ..Default::default()
        });
        assert_eq!(append(&mut story, &empty, &ctx), 0);
        assert!(story.is_empty());

        let spacer = Content::Spacer(Spacer { height: 5.0 });
        assert_eq!(append(&mut story, &spacer, &ctx), 1);
        assert_eq!(story.content_len(), 1);
    }

    #[test]
    fn test_parse_each_skips_bad_entries() {
        let items = vec![json!({"text": "ok"}), json!({"level": "high"}), json!({"level": 3, "text": "deep"})];
        let headings: Vec<Heading> = parse_each(&items, "heading");
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["ok", "deep"]);

        assert_eq!(parse_one::<Spacer>(Some(&json!({"height": 4.0})), "spacer"), Some(Spacer { height: 4.0 }));
        assert_eq!(parse_one::<Spacer>(Some(&json!("tall")), "spacer"), None);
        assert_eq!(parse_one::<Spacer>(Some(&Value::Null), "spacer"), None);
    }
}
