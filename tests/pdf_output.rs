//! # PDF Output Tests
//!
//! Whole builds written into temporary directories, then read back with
//! `lopdf` to check page counts, page text and file metadata.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document as PdfDocument, Object};
use pretty_assertions::assert_eq;
use serde_json::json;

use quire::chart::ChartKind;
use quire::compose::{self, ComposeRequest};
use quire::config::{ColorScheme, DocumentConfig, FooterConfig, Template, WatermarkConfig};
use quire::document::{BuildResult, Document, DocumentRequest, SectionKind, SectionOptions};
use quire::fetch::MemoryFetcher;
use quire::manipulate::{self, MergeOptions, Outcome};
use quire::output::OutputDirs;
use quire::presets;

// ============================================================================
// HELPERS
// ============================================================================

/// Text shown on each page, one string per page.
fn page_texts(path: &Path) -> Vec<String> {
    let pdf = PdfDocument::load(path).unwrap();
    pdf.get_pages()
        .values()
        .map(|&id| {
            let bytes = pdf.get_page_content(id).unwrap();
            let content = Content::decode(&bytes).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(s, _)) => Some(String::from_utf8_lossy(s).into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn success(result: BuildResult) -> (std::path::PathBuf, u64, usize, Vec<String>) {
    match result {
        BuildResult::Success {
            output_path,
            size_bytes,
            pages,
            components_used,
        } => (output_path, size_bytes, pages, components_used),
        BuildResult::Error { message } => panic!("build failed: {}", message),
    }
}

fn compose_in(dir: &Path, request: serde_json::Value) -> BuildResult {
    let output = OutputDirs::new(dir);
    compose::compose_value(request, &MemoryFetcher::new(), &output, None)
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[test]
fn test_document_round_trips_through_lopdf() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DocumentConfig::new(Template::Corporate, ColorScheme::CorporateBlue);
    config.table_of_contents = true;
    let mut doc = Document::new(config)
        .title("Quarterly Review")
        .meta("Author", "Finance")
        .with_output(OutputDirs::new(dir.path()))
        .with_fetcher(MemoryFetcher::new());
    doc.append_section("Summary", json!("Revenue grew **12%**."), SectionKind::Text, SectionOptions::default());
    doc.add_table(json!([["North", 120], ["South", 95]]), "Regions", Some(vec!["Region".into(), "Units".into()]));
    doc.add_chart(json!({"North": 120, "South": 95}), ChartKind::Pie, "Share");

    let path = dir.path().join("review.pdf");
    let report = doc.build(&path).unwrap();
    assert_eq!(report.size_bytes, std::fs::metadata(&path).unwrap().len());

    let pages = page_texts(&path);
    assert_eq!(pages.len(), report.pages);
    assert!(pages[0].contains("Quarterly Review"));
    assert!(pages[0].contains("Finance"));
    assert!(pages[1].contains("Table of Contents"));
    assert!(pages[2].contains("Summary"));
    assert!(pages[2].contains("North"));
    assert_eq!(
        report.components_used,
        vec![
            "title_page",
            "table_of_contents",
            "text sections (1)",
            "table sections (1)",
            "chart sections (1)"
        ]
    );

    let pdf = PdfDocument::load(&path).unwrap();
    let info_id = pdf.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    let info = pdf.get_dictionary(info_id).unwrap();
    assert!(matches!(info.get(b"Author"), Ok(Object::String(s, _)) if s.as_slice() == b"Finance"));
}

#[test]
fn test_breaks_between_sections_only() {
    let dir = tempfile::tempdir().unwrap();
    let request: DocumentRequest = serde_json::from_value(json!({
        "config": {"page_breaks_before_sections": true},
        "sections": [
            {"title": "Intro", "type": "text", "content": "Hello."},
            {"title": "Data", "type": "table", "content": [["a", "1"]]}
        ]
    }))
    .unwrap();
    let path = dir.path().join("sections.pdf");
    let report = request
        .into_document()
        .with_output(OutputDirs::new(dir.path()))
        .with_fetcher(MemoryFetcher::new())
        .build(&path)
        .unwrap();

    let pages = page_texts(&path);
    assert_eq!(report.pages, 2);
    assert!(pages[0].contains("Intro") && !pages[0].contains("Data"));
    assert!(pages[1].contains("Data"));
}

#[test]
fn test_furniture_on_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DocumentConfig::default();
    config.watermark = Some(WatermarkConfig::text("DRAFT"));
    config.footer = Some(FooterConfig {
        page_number_format: "Page {page} of {total}".into(),
        ..Default::default()
    });
    config.page_breaks_before_sections = true;
    let mut doc = Document::new(config).with_fetcher(MemoryFetcher::new());
    for name in ["One", "Two", "Three"] {
        doc.append_section(name, json!("Body text."), SectionKind::Text, SectionOptions::default());
    }

    let path = dir.path().join("furniture.pdf");
    let report = doc.build(&path).unwrap();
    assert_eq!(report.pages, 3);
    for (i, text) in page_texts(&path).iter().enumerate() {
        assert!(text.contains("DRAFT"), "page {} lacks watermark", i + 1);
        assert!(text.contains(&format!("Page {} of 3", i + 1)), "page {} lacks number", i + 1);
    }
    assert!(report.components_used.ends_with(&["watermark".to_string(), "footer".to_string()]));
}

#[test]
fn test_wide_table_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let result = compose_in(
        dir.path(),
        json!({
            "tables": [{
                "title": "Too wide",
                "data": [["a", "b", "c"], ["1", "2", "3"]],
                "column_widths": [400, 400, 400]
            }]
        }),
    );
    let (path, size, pages, used) = success(result);
    assert!(size > 0);
    assert_eq!(pages, 1);
    assert_eq!(used, vec!["tables (1)"]);
    assert!(page_texts(&path)[0].contains("Too wide"));
}

// ============================================================================
// COMPOSE
// ============================================================================

#[test]
fn test_compose_rejects_bad_watermark_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let result = compose_in(dir.path(), json!({"title": "X", "watermark": {"type": "image"}}));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"status": "error", "message": "Image watermark requires url field"})
    );
    assert!(!dir.path().join("pdfs").join("document.pdf").exists());
}

#[test]
fn test_compose_everything() {
    let dir = tempfile::tempdir().unwrap();
    let request = json!({
        "filename": "everything.pdf",
        "title": "Kitchen Sink",
        "cover": {"title": "Cover Title", "subtitle": "All of it", "author": "QA"},
        "headings": [{"level": 1, "text": "Overview", "content": "Intro body."}],
        "charts": [{"title": "Sales", "data": [3, 5, 2], "chart_type": "bar"}],
        "tables": [{"data": [["k", "v"]], "headers": ["Key", "Value"]}],
        "formatted": [{"text": "Bold words", "bold": true}],
        "lists": [{"items": ["alpha", "beta"]}],
        "colored": [{"text": "Up 5%", "color": "green", "style": "bold"}],
        "additional_content": "Closing remarks.",
        "signature": {"text": "Approved", "date": "2024-01-01"},
        "footnotes": [{"text": "A source."}],
        "endnotes": [{"text": "Later note."}],
        "form": [{"label": "Name"}, {"label": "Agree", "type": "checkbox"}],
        "appendix": [{"title": "Data", "content": "Raw."}],
        "summary": {"title": "In short", "summary": "Things went well."},
        "multi_column": [{"columns": ["left side", "right side"]}],
        "textbox": [{"text": "Boxed."}],
        "callout": [{"callout_type": "warning", "text": "Careful."}],
        "qr": [{"data": "https://example.com", "caption": "Scan"}],
        "header": {"text": "Internal"},
        "footer": {},
        "border": {"style": "double"},
        "background": {"type": "solid", "color": "#FAFAFA"}
    });
    let (path, _, pages, used) = success(compose_in(dir.path(), request));
    assert_eq!(path, dir.path().join("pdfs").join("everything.pdf"));

    let texts = page_texts(&path);
    assert_eq!(texts.len(), pages);
    assert!(texts[0].contains("Cover Title"));
    assert!(texts.iter().all(|t| t.contains("Internal")));
    let endnotes_page = texts.iter().position(|t| t.contains("Endnotes")).unwrap();
    let appendix_page = texts.iter().position(|t| t.contains("Appendix")).unwrap();
    assert!(endnotes_page > 0 && appendix_page > endnotes_page);

    for label in ["title", "headings (1)", "charts (1)", "background", "border", "signature", "cover", "qr (1)", "summary"] {
        assert!(used.iter().any(|u| u == label), "missing {}", label);
    }
}

#[test]
fn test_compose_signature_nan_size_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, pages, _) = success(compose_in(dir.path(), json!({"title": "T", "signature": {"font_size": "NaN"}})));
    assert_eq!(pages, 1);

    let pdf = PdfDocument::load(&path).unwrap();
    let first = *pdf.get_pages().values().next().unwrap();
    let raw = pdf.get_page_content(first).unwrap();
    assert!(!String::from_utf8_lossy(&raw).contains("NaN"));
    assert!(page_texts(&path)[0].contains("Digitally Signed"));
}

#[test]
fn test_compose_page_breaks_by_index() {
    let dir = tempfile::tempdir().unwrap();
    let request = ComposeRequest {
        headings: vec![json!({"text": "A"}), json!({"text": "B"}), json!({"text": "C"})],
        page_breaks: Some(json!([1, 2, "x", 2, 0])),
        ..Default::default()
    };
    let output = OutputDirs::new(dir.path());
    let (path, _, pages, _) = success(compose::compose(&request, &MemoryFetcher::new(), &output, None));
    assert_eq!(pages, 3);
    let texts = page_texts(&path);
    assert!(texts[0].contains('A') && texts[2].contains('C'));
}

// ============================================================================
// PRESETS
// ============================================================================

#[test]
fn test_invoice_preset_builds() {
    let dir = tempfile::tempdir().unwrap();
    let doc = presets::from_request(
        "invoice",
        json!({
            "invoice": {"number": "INV-001", "date": "2024-03-01", "due_date": "2024-03-31"},
            "company": {"name": "Acme Corp"},
            "client": {"name": "Globex"},
            "line_items": [{"description": "Consulting", "quantity": 10, "rate": 150, "amount": 1500}],
            "totals": {"subtotal": 1500, "tax": 150, "total": 1650}
        }),
    )
    .unwrap()
    .with_output(OutputDirs::new(dir.path()))
    .with_fetcher(MemoryFetcher::new());

    let path = dir.path().join("invoice.pdf");
    let report = doc.build(&path).unwrap();
    let all = page_texts(&path).join(" ");
    assert!(report.pages >= 2);
    assert!(all.contains("Invoice INV-001"));
    assert!(all.contains("$1500.00"));
    assert!(all.contains("INVOICE"));
}

#[test]
fn test_newsletter_flows_into_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = presets::preset_config("newsletter");
    assert_eq!(config.layout.frames().len(), 2);
    let mut doc = Document::new(config).with_fetcher(MemoryFetcher::new());
    let long = "Column text keeps flowing. ".repeat(200);
    doc.append_section("Lead story", json!(long), SectionKind::Text, SectionOptions::default());

    let path = dir.path().join("news.pdf");
    doc.build(&path).unwrap();

    // Text lands in both halves of the first page.
    let pdf = PdfDocument::load(&path).unwrap();
    let first = *pdf.get_pages().values().next().unwrap();
    let content = Content::decode(&pdf.get_page_content(first).unwrap()).unwrap();
    let xs: Vec<f32> = content
        .operations
        .iter()
        .filter(|op| op.operator == "Td")
        .filter_map(|op| op.operands.first().and_then(|x| x.as_float().ok()))
        .collect();
    assert!(xs.iter().any(|&x| x < 306.0));
    assert!(xs.iter().any(|&x| x > 306.0));
}

// ============================================================================
// MANIPULATION
// ============================================================================

#[test]
fn test_compose_outputs_merge_and_split_back() {
    let dir = tempfile::tempdir().unwrap();
    let (first, ..) = success(compose_in(dir.path(), json!({"filename": "one.pdf", "title": "First"})));
    let (second, ..) = success(compose_in(
        dir.path(),
        json!({"filename": "two.pdf", "title": "Second", "headings": [{"text": "A"}, {"text": "B"}], "page_breaks": [3]}),
    ));

    let merged = dir.path().join("merged.pdf");
    let options = MergeOptions {
        cover_page: false,
        ..Default::default()
    };
    let outcome: Outcome<_> = manipulate::merge(&[first, second], &merged, &options).into();
    let Outcome::Success(report) = outcome else {
        panic!("merge failed: {:?}", outcome);
    };
    assert_eq!(report.pages, 3);
    let texts = page_texts(&merged);
    assert!(texts[0].contains("First"));
    assert!(texts[1].contains("Second") && texts[2].contains('B'));

    let parts = manipulate::split(&merged, &dir.path().join("parts"), 1).unwrap();
    assert_eq!(parts.files_created, 3);
    assert_eq!(manipulate::info(&parts.output_files[2]).unwrap().total_pages, 1);
}
