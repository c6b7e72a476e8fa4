//! # Quire - Declarative Document Composition
//!
//! Quire turns a declarative description of a document (titles, headings,
//! tables, charts, images, cover pages, signatures, watermarks) into a
//! laid-out, paginated PDF. It provides:
//!
//! - **Content processors**: one per content kind, each appending drawable elements to a story
//! - **Charts**: auto-classification of arbitrary data, rasterized plots, generated palettes
//! - **Pagination**: frame flow with paragraph and table splitting, keep-together groups
//! - **Page furniture**: background, border, watermark, header and footer on every page
//! - **PDF output**: a small draw-op IR written out with `lopdf`
//! - **PDF manipulation**: merge with bookmarks and a cover page, split, inspect
//!
//! ## Quick Start
//!
//! ```no_run
//! use quire::{
//!     config::{ColorScheme, DocumentConfig, Template},
//!     document::{Document, SectionKind, SectionOptions},
//!     chart::ChartKind,
//! };
//! use serde_json::json;
//!
//! let config = DocumentConfig::new(Template::Corporate, ColorScheme::CorporateBlue);
//! let mut doc = Document::new(config).title("Quarterly Report").meta("Author", "Finance");
//!
//! doc.append_section("Summary", json!("Revenue grew **12%** year on year."), SectionKind::Text, SectionOptions::default());
//! doc.add_chart(json!({"Q1": 120, "Q2": 135, "Q3": 150}), ChartKind::Auto, "Revenue by quarter");
//!
//! let report = doc.build("report.pdf")?;
//! println!("{} bytes, {} pages", report.size_bytes, report.pages);
//! # Ok::<(), quire::error::QuireError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Document configuration: templates, schemes, layout, decorations |
//! | [`style`] | Style sheet derived from a configuration |
//! | [`content`] | Content records and their processors |
//! | [`chart`] | Chart classification, rendering and palettes |
//! | [`story`] | The ordered element story and page-break insertion |
//! | [`layout`] | Pagination into page canvases |
//! | [`decoration`] | Per-page furniture |
//! | [`document`] | Sectioned documents with title page and TOC |
//! | [`compose`] | All-components compose requests |
//! | [`presets`] | Named templates and request builders |
//! | [`canvas`] | Draw-op IR and PDF codegen |
//! | [`manipulate`] | Merging, splitting and inspecting finished PDFs |
//! | [`error`] | Error types |

pub mod canvas;
pub mod chart;
pub mod color;
pub mod compose;
pub mod config;
pub mod content;
pub mod context;
pub mod decoration;
pub mod document;
pub mod element;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod manipulate;
pub mod output;
pub mod presets;
pub mod primitives;
pub mod story;
pub mod style;
pub mod text;

// Re-exports for convenience
pub use config::DocumentConfig;
pub use document::{BuildResult, Document};
pub use error::QuireError;
