//! Back matter: footnotes, endnotes, form fields and the appendix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{ContentMeta, Process, non_blank};
use crate::chart::label_text;
use crate::context::RenderContext;
use crate::element::{Element, Paragraph, Role};
use crate::error::Skip;
use crate::primitives::Checkbox;
use crate::style::TextStyle;
use crate::text::{Font, markup};

// ============================================================================
// NOTES
// ============================================================================

/// A numbered note. Without `number` it is numbered by position among the
/// notes that have text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub text: String,
    pub number: Option<Value>,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            number: None,
        }
    }
}

/// Notes with text, paired with their printed numbers.
fn numbered(notes: &[Note]) -> Vec<(String, &str)> {
    notes
        .iter()
        .filter_map(|n| non_blank(&n.text).map(|t| (n, t)))
        .enumerate()
        .map(|(i, (note, text))| {
            let number = match &note.number {
                Some(v) if !v.is_null() => label_text(v),
                _ => (i + 1).to_string(),
            };
            (number, text)
        })
        .collect()
}

/// Raised note number followed by the note text.
fn note_paragraph(number: &str, text: &str, style: &TextStyle) -> Element {
    let base = style.base_span();
    let mut mark = base.with_text(number);
    mark.size = style.size * 0.7;
    mark.rise = style.size * 0.4;
    let mut spans = vec![mark, base.with_text(" ")];
    spans.extend(markup::parse_inline(text, &base));
    Paragraph::from_spans(spans, style).into()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footnotes {
    #[serde(alias = "footnotes")]
    pub notes: Vec<Note>,
}

impl ContentMeta for Footnotes {
    fn label() -> &'static str {
        "Footnotes"
    }
}

impl Process for Footnotes {
    fn process(&self, _ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let notes = numbered(&self.notes);
        if notes.is_empty() {
            return Err(Skip::new("no footnotes with text"));
        }
        let header = TextStyle::new(Font::HelveticaBold, 12.0);
        let style = TextStyle::new(Font::Helvetica, 10.0).leading(12.0).indent(20.0, 0.0);

        let mut out = vec![Element::Spacer(20.0), Paragraph::plain("Footnotes:", &header).into()];
        for (number, text) in notes {
            out.push(note_paragraph(&number, text, &style));
            out.push(Element::Spacer(3.0));
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endnotes {
    #[serde(alias = "endnotes")]
    pub notes: Vec<Note>,
}

impl ContentMeta for Endnotes {
    fn label() -> &'static str {
        "Endnotes"
    }
}

impl Process for Endnotes {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let notes = numbered(&self.notes);
        if notes.is_empty() {
            return Err(Skip::new("no endnotes with text"));
        }
        let style = TextStyle::new(Font::Helvetica, 11.0).leading(13.0).indent(15.0, 0.0);

        let mut out = vec![
            Element::PageBreak,
            Paragraph::plain("Endnotes", &ctx.sheet.heading2).role(Role::Heading(2)).into(),
            Element::Spacer(12.0),
        ];
        for (number, text) in notes {
            out.push(note_paragraph(&number, text, &style));
            out.push(Element::Spacer(6.0));
        }
        Ok(out)
    }
}

// ============================================================================
// FORM FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Checkbox,
    Date,
    Signature,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Signature => "signature",
        }
    }

    /// Blank to fill in; `None` for a drawn box.
    fn blank(self) -> Option<String> {
        match self {
            FieldKind::Checkbox => None,
            FieldKind::Date => Some("___/___/______".to_string()),
            FieldKind::Signature => Some("_".repeat(30)),
            FieldKind::Text => Some("_".repeat(20)),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown field types read as text.
impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "checkbox" => FieldKind::Checkbox,
            "date" => FieldKind::Date,
            "signature" => FieldKind::Signature,
            _ => FieldKind::Text,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub label: String,
    #[serde(rename = "type", alias = "field_type")]
    pub kind: FieldKind,
}

impl FormField {
    pub fn new(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub fields: Vec<FormField>,
}

impl ContentMeta for FormFields {
    fn label() -> &'static str {
        "Form"
    }
}

impl Process for FormFields {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let fields: Vec<(&str, FieldKind)> = self
            .fields
            .iter()
            .filter_map(|f| non_blank(&f.label).map(|l| (l, f.kind)))
            .collect();
        if fields.is_empty() {
            return Err(Skip::new("no form fields with a label"));
        }
        let style = TextStyle::new(Font::Helvetica, 11.0).leading(16.0);

        let mut out = vec![
            Element::Spacer(20.0),
            Paragraph::plain("Form Fields", &ctx.sheet.heading3).role(Role::Heading(3)).into(),
            Element::Spacer(10.0),
        ];
        for (label, kind) in fields {
            let field = match kind.blank() {
                Some(blank) => Paragraph::plain(&format!("{}: {}", label, blank), &style).into(),
                None => Element::Primitive(Checkbox::new(label).into()),
            };
            out.push(field);
            out.push(Element::Spacer(8.0));
        }
        Ok(out)
    }
}

// ============================================================================
// APPENDIX
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appendix {
    pub sections: Vec<AppendixSection>,
}

impl ContentMeta for Appendix {
    fn label() -> &'static str {
        "Appendix"
    }
}

impl Process for Appendix {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let sections: Vec<&AppendixSection> = self
            .sections
            .iter()
            .filter(|s| !s.title.trim().is_empty() || !s.content.trim().is_empty())
            .collect();
        if sections.is_empty() {
            return Err(Skip::new("appendix has no sections"));
        }
        let title_style = TextStyle::new(Font::HelveticaBold, 14.0).spacing(0.0, 8.0);
        let body = TextStyle::new(Font::Helvetica, 11.0).leading(14.0);

        let mut out = vec![
            Element::PageBreak,
            Paragraph::plain("Appendix", &ctx.sheet.heading2).role(Role::Heading(2)).into(),
            Element::Spacer(15.0),
        ];
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                out.push(Element::Spacer(8.0));
            }
            let heading = match non_blank(&section.title) {
                Some(title) => format!("A.{} {}", i + 1, title),
                None => format!("A.{}", i + 1),
            };
            out.push(Paragraph::plain(&heading, &title_style).role(Role::Heading(3)).into());
            if let Some(content) = non_blank(&section.content) {
                out.push(Paragraph::new(content, &body).into());
                out.push(Element::Spacer(12.0));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::fetch::MemoryFetcher;
    use crate::output::OutputDirs;
    use crate::primitives::Primitive;
    use crate::style::StyleSheet;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(content: &dyn Process) -> Result<Vec<Element>, Skip> {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::resolve(&config);
        let fetcher = MemoryFetcher::new();
        let output = OutputDirs::default();
        let ctx = RenderContext::new(&config, &sheet, &fetcher, &output);
        content.process(&ctx)
    }

    fn texts(out: &[Element]) -> Vec<String> {
        out.iter()
            .filter_map(|e| match e {
                Element::Paragraph(p) => Some(p.text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_footnotes_number_after_filtering() {
        let notes: Footnotes = serde_json::from_value(json!({"notes": [
            {"text": ""},
            {"text": "First source"},
            {"text": "Explicit", "number": "*"},
            {"number": 9},
        ]}))
        .unwrap();
        let out = run(&notes).unwrap();
        assert_eq!(texts(&out), vec!["Footnotes:", "1 First source", "* Explicit"]);

        let Element::Paragraph(p) = &out[2] else { panic!("expected paragraph") };
        assert!(p.spans[0].rise > 0.0);
        assert_eq!(p.style.left_indent, 20.0);
        assert!(run(&Footnotes::default()).is_err());
    }

    #[test]
    fn test_endnotes_start_new_page() {
        let notes = Endnotes {
            notes: vec![Note::new("Later")],
        };
        let out = run(&notes).unwrap();
        assert_eq!(out[0], Element::PageBreak);
        assert_eq!(texts(&out), vec!["Endnotes", "1 Later"]);
    }

    #[test]
    fn test_form_field_blanks() {
        let form: FormFields = serde_json::from_value(json!({"fields": [
            {"label": "Name"},
            {"label": "Agree", "type": "checkbox"},
            {"label": "When", "type": "date"},
            {"label": "Sign", "type": "signature"},
            {"type": "text"},
        ]}))
        .unwrap();
        let out = run(&form).unwrap();
        let lines = texts(&out);
        assert_eq!(lines[0], "Form Fields");
        assert_eq!(lines[1], format!("Name: {}", "_".repeat(20)));
        assert_eq!(lines[2], "When: ___/___/______");
        assert_eq!(lines[3], format!("Sign: {}", "_".repeat(30)));
        assert!(out.iter().any(|e| matches!(e, Element::Primitive(Primitive::Checkbox(c)) if c.label == "Agree")));
    }

    #[test]
    fn test_appendix_numbering() {
        let appendix: Appendix = serde_json::from_value(json!({"sections": [
            {"title": "Data", "content": "Raw tables."},
            {},
            {"title": "Method"},
        ]}))
        .unwrap();
        let out = run(&appendix).unwrap();
        assert_eq!(out[0], Element::PageBreak);
        assert_eq!(texts(&out), vec!["Appendix", "A.1 Data", "Raw tables.", "A.2 Method"]);
    }
}
