//! # Presets
//!
//! Named document templates ([`PRESETS`]) and builders that turn a typed
//! request (a business report, an invoice, a slide deck...) into a ready
//! [`Document`].
//!
//! | Preset | Look |
//! |--------|------|
//! | `business_report` | corporate, TOC, numbered sections, faint CONFIDENTIAL |
//! | `academic_paper` | wide margins, double spacing, footnotes |
//! | `newsletter` | two columns |
//! | `brochure` | three columns |
//! | `presentation`, `certificate`, `dashboard` | landscape |
//!
//! Unknown preset names fall back to `minimal` with a warning.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::chart::ChartKind;
use crate::config::{
    ColorScheme, DocumentConfig, FooterConfig, HeaderConfig, INCH, Margins, Orientation, Template, WatermarkConfig,
};
use crate::content::parse_each;
use crate::document::{Document, SectionKind, SectionOptions};
use crate::error::QuireError;

// ============================================================================
// NAMED TEMPLATES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub use_cases: &'static [&'static str],
    #[serde(skip)]
    template: Template,
    #[serde(skip)]
    scheme: ColorScheme,
    #[serde(skip)]
    tweak: fn(&mut DocumentConfig),
}

impl Preset {
    pub fn config(&self) -> DocumentConfig {
        let mut config = DocumentConfig::new(self.template, self.scheme);
        (self.tweak)(&mut config);
        config
    }
}

fn page_numbers() -> Option<FooterConfig> {
    Some(FooterConfig::default())
}

fn no_tweak(_: &mut DocumentConfig) {}

fn business_report(c: &mut DocumentConfig) {
    c.header = Some(HeaderConfig::new("Business Report"));
    c.footer = page_numbers();
    c.table_of_contents = true;
    c.section_numbering = true;
    let mut watermark = WatermarkConfig::text("CONFIDENTIAL");
    if let WatermarkConfig::Text { opacity, .. } = &mut watermark {
        *opacity = 0.05;
    }
    c.watermark = Some(watermark);
}

fn academic_paper(c: &mut DocumentConfig) {
    c.layout.margins = Margins {
        top: 1.5 * INCH,
        bottom: 1.5 * INCH,
        left: 1.25 * INCH,
        right: 1.25 * INCH,
    };
    c.typography.base_size = 12.0;
    c.typography.line_height = 2.0;
    c.footnotes = true;
    c.table_of_contents = true;
}

fn invoice(c: &mut DocumentConfig) {
    let date = Local::now().format("%Y-%m-%d");
    c.header = Some(HeaderConfig::new(format!("INVOICE - {}", date)));
}

fn landscape(c: &mut DocumentConfig) {
    c.layout.orientation = Orientation::Landscape;
}

fn presentation(c: &mut DocumentConfig) {
    landscape(c);
    c.typography.base_size = 14.0;
}

fn resume(c: &mut DocumentConfig) {
    c.layout.margins = Margins::uniform(0.75 * INCH);
}

fn brochure(c: &mut DocumentConfig) {
    c.layout.columns = 3;
    c.layout.column_gap = 0.2 * INCH;
}

fn certificate(c: &mut DocumentConfig) {
    landscape(c);
    c.typography.base_size = 16.0;
}

fn manual(c: &mut DocumentConfig) {
    c.table_of_contents = true;
    c.section_numbering = true;
    c.page_breaks_before_sections = true;
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "minimal",
        display_name: "Minimal",
        description: "Clean, simple design with basic formatting",
        use_cases: &["Simple documents", "Letters", "Basic reports"],
        template: Template::Minimal,
        scheme: ColorScheme::Classic,
        tweak: no_tweak,
    },
    Preset {
        name: "business_report",
        display_name: "Business Report",
        description: "Professional corporate design with TOC and sections",
        use_cases: &["Business reports", "Annual reports", "Proposals"],
        template: Template::Corporate,
        scheme: ColorScheme::CorporateBlue,
        tweak: business_report,
    },
    Preset {
        name: "academic_paper",
        display_name: "Academic Paper",
        description: "Formal academic style with double spacing and footnotes",
        use_cases: &["Research papers", "Theses", "Academic articles"],
        template: Template::Academic,
        scheme: ColorScheme::Classic,
        tweak: academic_paper,
    },
    Preset {
        name: "invoice",
        display_name: "Invoice",
        description: "Professional invoice template with company branding",
        use_cases: &["Invoices", "Bills", "Financial documents"],
        template: Template::Invoice,
        scheme: ColorScheme::CorporateBlue,
        tweak: invoice,
    },
    Preset {
        name: "presentation",
        display_name: "Presentation",
        description: "Landscape layout optimized for presentations",
        use_cases: &["Slide decks", "Presentations", "Visual reports"],
        template: Template::Presentation,
        scheme: ColorScheme::Vibrant,
        tweak: presentation,
    },
    Preset {
        name: "newsletter",
        display_name: "Newsletter",
        description: "Multi-column magazine-style layout",
        use_cases: &["Newsletters", "Magazines", "Brochures"],
        template: Template::Magazine,
        scheme: ColorScheme::Modern,
        tweak: no_tweak,
    },
    Preset {
        name: "resume",
        display_name: "Resume",
        description: "Professional resume template with tight spacing",
        use_cases: &["Resumes", "CVs", "Professional profiles"],
        template: Template::Minimal,
        scheme: ColorScheme::Classic,
        tweak: resume,
    },
    Preset {
        name: "brochure",
        display_name: "Brochure",
        description: "Tri-fold brochure design with vibrant colors",
        use_cases: &["Marketing materials", "Product brochures", "Flyers"],
        template: Template::Brochure,
        scheme: ColorScheme::Vibrant,
        tweak: brochure,
    },
    Preset {
        name: "certificate",
        display_name: "Certificate",
        description: "Formal certificate template with decorative elements",
        use_cases: &["Certificates", "Awards", "Diplomas"],
        template: Template::Certificate,
        scheme: ColorScheme::Nature,
        tweak: certificate,
    },
    Preset {
        name: "manual",
        display_name: "Manual",
        description: "Technical documentation with numbered sections",
        use_cases: &["User manuals", "Technical docs", "Guides"],
        template: Template::Academic,
        scheme: ColorScheme::Classic,
        tweak: manual,
    },
    Preset {
        name: "dashboard",
        display_name: "Dashboard",
        description: "Data visualization template with KPI widgets",
        use_cases: &["Dashboards", "Analytics reports", "KPI summaries"],
        template: Template::Presentation,
        scheme: ColorScheme::Modern,
        tweak: landscape,
    },
];

pub fn find(name: &str) -> Option<&'static Preset> {
    let wanted = name.trim().to_ascii_lowercase();
    let wanted = match wanted.as_str() {
        "academic" => "academic_paper",
        "business" => "business_report",
        other => other,
    };
    PRESETS.iter().find(|p| p.name == wanted)
}

/// Configuration of the named preset, or `minimal` when unknown.
pub fn preset_config(name: &str) -> DocumentConfig {
    match find(name) {
        Some(preset) => preset.config(),
        None => {
            log::warn!("unknown preset '{}', using minimal", name);
            DocumentConfig::default()
        }
    }
}

// ============================================================================
// REQUEST BUILDERS
// ============================================================================

fn generated_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ChartInput {
    title: Option<String>,
    data: Value,
    #[serde(rename = "type", alias = "chart_type")]
    kind: Option<ChartKind>,
    description: Option<String>,
}

impl ChartInput {
    fn title_or(&self, fallback: String) -> String {
        self.title.clone().filter(|t| !t.trim().is_empty()).unwrap_or(fallback)
    }

    fn kind(&self) -> ChartKind {
        self.kind.unwrap_or(ChartKind::Auto)
    }
}

fn default_level_two() -> u8 {
    2
}

#[derive(Debug, Clone, Deserialize)]
struct ReportSection {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Value,
    #[serde(default, rename = "type")]
    kind: SectionKind,
    #[serde(default = "default_level_two")]
    level: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct BusinessReportRequest {
    title: String,
    executive_summary: String,
    sections: Vec<Value>,
    #[serde(alias = "charts_data")]
    charts: Vec<Value>,
    metadata: Option<Map<String, Value>>,
}

fn business_report_doc(req: BusinessReportRequest) -> Document {
    let mut doc = Document::new(preset_config("business_report")).title(req.title);
    match req.metadata {
        Some(meta) => {
            for (k, v) in &meta {
                doc.metadata.push((k.clone(), text_of(v)));
            }
        }
        None => {
            doc = doc
                .meta("Document Type", "Business Report")
                .meta("Generated", generated_now());
        }
    }
    doc.append_section(
        "Executive Summary",
        Value::String(req.executive_summary),
        SectionKind::Text,
        SectionOptions::default(),
    );
    for section in parse_each::<ReportSection>(&req.sections, "section") {
        let options = SectionOptions {
            level: section.level,
            ..Default::default()
        };
        let title = section.title.unwrap_or_else(|| "Untitled Section".into());
        doc.append_section(title, section.content, section.kind, options);
    }
    for (i, chart) in parse_each::<ChartInput>(&req.charts, "chart").into_iter().enumerate() {
        doc.add_chart(chart.data.clone(), chart.kind(), &chart.title_or(format!("Chart {}", i + 1)));
    }
    doc
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DashboardRequest {
    title: String,
    widgets: Value,
    charts: Vec<Value>,
    layout: Orientation,
}

fn dashboard_doc(req: DashboardRequest, orientation_given: bool) -> Document {
    let mut config = preset_config("dashboard");
    if orientation_given {
        config.layout.orientation = req.layout;
    }
    let mut doc = Document::new(config)
        .title(req.title)
        .meta("Document Type", "Data Dashboard")
        .meta("Generated", generated_now());
    if req.widgets.as_array().is_some_and(|w| !w.is_empty()) {
        doc.add_dashboard(req.widgets, "Key Performance Indicators");
    }
    for chart in parse_each::<ChartInput>(&req.charts, "chart") {
        doc.add_chart(chart.data.clone(), chart.kind(), &chart.title_or("Chart".into()));
    }
    doc
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Party {
    name: String,
    address: String,
    phone: String,
    email: String,
}

impl Party {
    fn block(&self) -> String {
        [&self.name, &self.address, &self.phone, &self.email]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct InvoiceInfo {
    number: Value,
    date: Value,
    due_date: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LineItem {
    description: String,
    quantity: Value,
    rate: f64,
    amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Totals {
    subtotal: f64,
    tax: f64,
    total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct InvoiceRequest {
    #[serde(alias = "invoice_data")]
    invoice: InvoiceInfo,
    #[serde(alias = "company_info")]
    company: Party,
    #[serde(alias = "client_info")]
    client: Party,
    line_items: Vec<Value>,
    totals: Totals,
}

fn or_na(value: &Value) -> String {
    match text_of(value) {
        s if s.trim().is_empty() => "N/A".into(),
        s => s,
    }
}

fn invoice_doc(req: InvoiceRequest) -> Document {
    let number = or_na(&req.invoice.number);
    let mut doc = Document::new(preset_config("invoice")).title(format!("Invoice {}", number));
    let text = |doc: &mut Document, title: &str, body: String| {
        doc.append_section(title, Value::String(body), SectionKind::Text, SectionOptions::default());
    };

    text(&mut doc, "From", req.company.block());
    text(&mut doc, "Bill To", req.client.block());
    text(
        &mut doc,
        "Invoice Details",
        format!(
            "Invoice Number: {}\n\nInvoice Date: {}\n\nDue Date: {}",
            number,
            or_na(&req.invoice.date),
            or_na(&req.invoice.due_date)
        ),
    );

    let rows: Vec<Value> = parse_each::<LineItem>(&req.line_items, "line item")
        .into_iter()
        .map(|item| {
            json!([
                item.description,
                text_of(&item.quantity),
                format!("${:.2}", item.rate),
                format!("${:.2}", item.amount)
            ])
        })
        .collect();
    let headers = ["Description", "Quantity", "Rate", "Amount"].map(String::from).to_vec();
    doc.add_table(Value::Array(rows), "Line Items", Some(headers));

    text(
        &mut doc,
        "Totals",
        format!(
            "Subtotal: ${:.2}\n\nTax: ${:.2}\n\n**Total: ${:.2}**",
            req.totals.subtotal, req.totals.tax, req.totals.total
        ),
    );
    doc
}

fn default_report_template() -> String {
    "business_report".into()
}

#[derive(Debug, Clone, Deserialize)]
struct ChartReportRequest {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "visualizations")]
    charts: Vec<Value>,
    #[serde(default = "default_report_template")]
    template: String,
    /// Data visualization reports open with a summary and add statistics.
    #[serde(default)]
    include_summary: bool,
}

fn chart_report_doc(req: ChartReportRequest, doc_type: &str) -> Document {
    let charts = parse_each::<ChartInput>(&req.charts, "chart");
    let mut doc = Document::new(preset_config(&req.template))
        .title(req.title)
        .meta("Document Type", doc_type)
        .meta("Generated", generated_now())
        .meta("Charts", charts.len().to_string());

    if req.include_summary {
        let summary = format!(
            "This report contains {} data visualizations generated automatically based on the provided data. \
             Each visualization was chosen to fit the type and structure of its data.\n\nGenerated on: {}",
            charts.len(),
            Local::now().format("%Y-%m-%d at %H:%M:%S")
        );
        doc.append_section("Executive Summary", Value::String(summary), SectionKind::Text, SectionOptions::default());
    }

    for (i, chart) in charts.into_iter().enumerate() {
        let title = chart.title_or(format!("Chart {}", i + 1));
        let options = SectionOptions {
            chart_type: chart.kind(),
            show_summary: req.include_summary,
            ..Default::default()
        };
        doc.append_section(title.clone(), chart.data, SectionKind::Chart, options);
        if let Some(description) = chart.description.filter(|d| !d.trim().is_empty()) {
            doc.append_section(
                format!("Analysis: {}", title),
                Value::String(description),
                SectionKind::Text,
                SectionOptions::default(),
            );
        }
    }
    doc
}

/// One slide, or one section of a multi-section document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Block {
    title: Option<String>,
    content: Value,
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Value,
    chart_type: Option<ChartKind>,
    image_source: String,
    caption: String,
    headers: Option<Vec<String>>,
    widgets: Value,
    level: Option<u8>,
    subsections: Vec<Value>,
}

impl Block {
    fn kind(&self) -> String {
        self.kind.as_deref().unwrap_or("text").trim().to_ascii_lowercase()
    }

    /// Add this block to `doc`. `fallback` titles untitled blocks.
    fn append_to(self, doc: &mut Document, fallback: &str, level: u8) {
        let title = self.title.clone().filter(|t| !t.trim().is_empty()).unwrap_or_else(|| fallback.to_string());
        let level = self.level.unwrap_or(level);
        match self.kind().as_str() {
            "chart" => {
                doc.add_chart(self.data, self.chart_type.unwrap_or(ChartKind::Auto), &title);
            }
            "image" => {
                doc.add_image(&self.image_source, &title, &self.caption);
            }
            "table" => {
                doc.add_table(self.data, &title, self.headers);
            }
            "dashboard" => {
                doc.add_dashboard(self.widgets, &title);
            }
            "mixed" => {
                let options = SectionOptions {
                    level,
                    ..Default::default()
                };
                doc.append_section(title, Value::String(String::new()), SectionKind::Text, options);
                for sub in parse_each::<Block>(&self.subsections, "subsection") {
                    let fallback = match sub.kind().as_str() {
                        "chart" => "Chart",
                        "table" => "Table",
                        _ => "",
                    };
                    sub.append_to(doc, fallback, level + 1);
                }
            }
            _ => {
                let options = SectionOptions {
                    level,
                    ..Default::default()
                };
                doc.append_section(title, self.content, SectionKind::Text, options);
            }
        }
    }
}

fn default_theme() -> String {
    "modern".into()
}

#[derive(Debug, Clone, Deserialize)]
struct PresentationRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    slides: Vec<Value>,
    #[serde(default = "default_theme")]
    theme: String,
}

fn presentation_doc(req: PresentationRequest) -> Document {
    let mut config = preset_config("presentation");
    match req.theme.as_str() {
        "corporate" => config.set_color_scheme(ColorScheme::CorporateBlue),
        "creative" => config.set_color_scheme(ColorScheme::Vibrant),
        "minimal" => config.set_color_scheme(ColorScheme::Monochrome),
        _ => {}
    }
    config.page_breaks_before_sections = true;

    let slides = parse_each::<Block>(&req.slides, "slide");
    let mut doc = Document::new(config)
        .title(req.title)
        .meta("Document Type", "Presentation")
        .meta("Theme", req.theme.clone())
        .meta("Slides", slides.len().to_string())
        .meta("Generated", generated_now());
    for (i, slide) in slides.into_iter().enumerate() {
        slide.append_to(&mut doc, &format!("Slide {}", i + 1), 1);
    }
    doc
}

fn default_true() -> bool {
    true
}

fn default_multi_template() -> String {
    "academic".into()
}

#[derive(Debug, Clone, Deserialize)]
struct MultiSectionRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    sections: Vec<Value>,
    #[serde(default = "default_multi_template")]
    template: String,
    #[serde(default = "default_true")]
    include_toc: bool,
    #[serde(default = "default_true")]
    include_page_numbers: bool,
}

fn multi_section_doc(req: MultiSectionRequest) -> Document {
    let mut config = preset_config(&req.template);
    config.table_of_contents = req.include_toc;
    config.footer = if req.include_page_numbers {
        config.footer.or_else(page_numbers)
    } else {
        None
    };

    let sections = parse_each::<Block>(&req.sections, "section");
    let mut doc = Document::new(config)
        .title(req.title)
        .meta("Document Type", "Multi-Section Document")
        .meta("Template", req.template.clone())
        .meta("Sections", sections.len().to_string())
        .meta("Generated", generated_now());
    for section in sections {
        section.append_to(&mut doc, "Untitled Section", 1);
    }
    doc
}

/// A small document showing what `template` looks like.
pub fn sample_document(template: &str) -> Document {
    let title = format!(
        "Sample {} Document",
        template
            .split('_')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    );
    let mut doc = Document::new(preset_config(template))
        .title(title)
        .meta("Document Type", "Sample Document")
        .meta("Template", template)
        .meta("Generated", generated_now());
    doc.append_section(
        "Introduction",
        json!("This sample shows the formatting, styling and layout features of the document engine."),
        SectionKind::Text,
        SectionOptions::default(),
    );
    doc.add_chart(
        json!({"Sales": 150000, "Marketing": 85000, "Development": 120000, "Support": 60000}),
        ChartKind::Bar,
        "Sample Chart",
    );
    doc.add_table(
        json!([
            ["Q1", "100", "150", "200"],
            ["Q2", "120", "180", "220"],
            ["Q3", "140", "200", "240"],
            ["Q4", "160", "220", "260"]
        ]),
        "Sample Table",
        Some(["Quarter", "Product A", "Product B", "Product C"].map(String::from).to_vec()),
    );
    doc.append_section(
        "Conclusion",
        json!("Templates, charts, tables and page decorations all come together in one build."),
        SectionKind::Text,
        SectionOptions::default(),
    );
    doc
}

/// Request builders by name, for `quire preset <name>`.
pub const BUILDERS: &[&str] = &[
    "business_report",
    "data_dashboard",
    "invoice",
    "chart_report",
    "data_visualization",
    "presentation",
    "multi_section",
    "sample",
];

/// Build the document for builder `name` from its JSON request.
pub fn from_request(name: &str, request: Value) -> Result<Document, QuireError> {
    let doc = match name.trim().to_ascii_lowercase().as_str() {
        "business_report" => business_report_doc(serde_json::from_value(request)?),
        "data_dashboard" | "dashboard" => {
            let orientation_given = request.get("layout").is_some();
            dashboard_doc(serde_json::from_value(request)?, orientation_given)
        }
        "invoice" => invoice_doc(serde_json::from_value(request)?),
        "chart_report" => chart_report_doc(serde_json::from_value(request)?, "Chart Report"),
        "data_visualization" => {
            let mut request = request;
            if let Value::Object(map) = &mut request {
                map.entry("include_summary").or_insert(Value::Bool(true));
            }
            chart_report_doc(serde_json::from_value(request)?, "Data Visualization Report")
        }
        "presentation" => presentation_doc(serde_json::from_value(request)?),
        "multi_section" => multi_section_doc(serde_json::from_value(request)?),
        "sample" => {
            let template = request.get("template").and_then(Value::as_str).unwrap_or("business_report");
            sample_document(template)
        }
        other => {
            return Err(QuireError::Validation(format!(
                "unknown preset builder '{}' (expected one of: {})",
                other,
                BUILDERS.join(", ")
            )));
        }
    };
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_named_presets() {
        let report = preset_config("business_report");
        assert_eq!(report.template(), Template::Corporate);
        assert!(report.table_of_contents && report.section_numbering);
        assert!(matches!(report.watermark, Some(WatermarkConfig::Text { opacity, .. }) if opacity == 0.05));

        let paper = preset_config("academic");
        assert_eq!(paper.layout.margins.left, 90.0);
        assert_eq!(paper.typography.line_height, 2.0);

        assert_eq!(preset_config("newsletter").layout.columns, 2);
        assert_eq!(preset_config("brochure").layout.columns, 3);
        assert_eq!(preset_config("dashboard").layout.orientation, Orientation::Landscape);
        assert_eq!(preset_config("nope"), DocumentConfig::default());
        assert_eq!(PRESETS.len(), 11);
    }

    #[test]
    fn test_invoice_sections() {
        let doc = from_request(
            "invoice",
            json!({
                "invoice_data": {"number": "INV-7", "date": "2024-05-01"},
                "company_info": {"name": "Acme"},
                "client_info": {"name": "Globex"},
                "line_items": [{"description": "Widget", "quantity": 2, "rate": 5, "amount": 10}, "junk"],
                "totals": {"subtotal": 10, "tax": 1, "total": 11}
            }),
        )
        .unwrap();
        assert_eq!(doc.title, "Invoice INV-7");
        let titles: Vec<&str> = doc.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["From", "Bill To", "Invoice Details", "Line Items", "Totals"]);
        let table = &doc.sections()[3];
        assert_eq!(table.content, json!([["Widget", "2", "$5.00", "$10.00"]]));
        assert!(doc.sections()[2].content.as_str().unwrap().contains("Due Date: N/A"));
    }

    #[test]
    fn test_presentation_breaks_and_slide_titles() {
        let doc = from_request(
            "presentation",
            json!({
                "title": "Deck",
                "theme": "corporate",
                "slides": [
                    {"content": "Hello"},
                    {"title": "Numbers", "type": "chart", "data": [1, 2, 3]}
                ]
            }),
        )
        .unwrap();
        assert!(doc.config.page_breaks_before_sections);
        assert_eq!(doc.config.color_scheme(), ColorScheme::CorporateBlue);
        assert_eq!(doc.sections()[0].title, "Slide 1");
        assert_eq!(doc.sections()[1].kind, SectionKind::Chart);
    }

    #[test]
    fn test_mixed_sections_nest_levels() {
        let doc = from_request(
            "multi_section",
            json!({
                "title": "Guide",
                "sections": [{
                    "title": "Part",
                    "type": "mixed",
                    "subsections": [
                        {"type": "text", "title": "Sub", "content": "x"},
                        {"type": "table", "data": [["a"]]}
                    ]
                }]
            }),
        )
        .unwrap();
        let levels: Vec<(String, u8)> = doc.toc().iter().map(|e| (e.title.clone(), e.level)).collect();
        assert_eq!(
            levels,
            vec![("Part".to_string(), 1), ("Sub".to_string(), 2), ("Table".to_string(), 1)]
        );
    }

    #[test]
    fn test_visualization_report_adds_summary() {
        let doc = from_request(
            "data_visualization",
            json!({"title": "Viz", "visualizations": [{"data": [1, 2, 3], "description": "Rising"}]}),
        )
        .unwrap();
        let titles: Vec<&str> = doc.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Executive Summary", "Chart 1", "Analysis: Chart 1"]);
        assert!(doc.sections()[1].options.show_summary);
    }

    #[test]
    fn test_unknown_builder_is_validation_error() {
        assert!(matches!(from_request("poster", json!({})), Err(QuireError::Validation(_))));
        assert_eq!(sample_document("business_report").title, "Sample Business Report Document");
    }
}
