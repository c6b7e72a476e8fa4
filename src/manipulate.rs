//! # PDF Manipulation
//!
//! Operations on finished PDFs: merging several files into one, splitting a
//! file into page ranges, and reading a file's basic facts.
//!
//! Pages move between files by deep copy. Every object a page reaches
//! (content streams, resources, fonts, images) is copied once into the
//! target and references are renumbered on the way:
//!
//! ```text
//!   source page ─▶ Resources ─▶ Font, XObject ...
//!        │              (copied once, ids remapped)
//!        └─ Parent      (dropped; re-pointed at the target page tree)
//! ```
//!
//! Attributes a page inherits from its page-tree ancestors (media box,
//! resources, rotation) are pulled down onto the copy first, so nothing is
//! lost when the old tree is left behind.
//!
//! Every entry point returns `Result`; [`Outcome`] folds one into the same
//! `{"status": ...}` shape as [`crate::BuildResult`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use lopdf::{Dictionary, Document as PdfDocument, Object, ObjectId, dictionary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canvas::pdf::info_string;
use crate::config::DocumentConfig;
use crate::document::{Document, SectionKind, SectionOptions, save_pdf};
use crate::error::QuireError;
use crate::fetch::MemoryFetcher;

/// Page attributes a page may inherit from the page tree.
const INHERITED: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page-tree depth beyond which inheritance lookups give up.
const MAX_TREE_DEPTH: usize = 32;

// ============================================================================
// RESULTS
// ============================================================================

/// Success payload or error message, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Success(T),
    Error { message: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl<T> From<Result<T, QuireError>> for Outcome<T> {
    fn from(result: Result<T, QuireError>) -> Self {
        match result {
            Ok(report) => Outcome::Success(report),
            Err(e) => {
                log::error!("PDF operation failed: {}", e);
                Outcome::Error { message: e.to_string() }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub input_files: Vec<PathBuf>,
    pub files_merged: usize,
    pub pages: usize,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    pub input_file: PathBuf,
    pub output_directory: PathBuf,
    pub output_files: Vec<PathBuf>,
    pub total_pages: usize,
    pub files_created: usize,
    pub pages_per_file: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
    pub width_inches: f32,
    pub height_inches: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfInfo {
    pub filename: PathBuf,
    pub size_bytes: u64,
    pub total_pages: usize,
    pub encrypted: bool,
    /// Info dictionary entries, keys lowercased.
    pub metadata: BTreeMap<String, String>,
    /// Size of the first page.
    pub page_size: Option<PageSize>,
}

// ============================================================================
// MERGE
// ============================================================================

fn default_cover_title() -> String {
    "Merged Document".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// One outline entry per merged file, pointing at its first page.
    pub bookmarks: bool,
    /// Prepend a generated page listing the merged files.
    pub cover_page: bool,
    pub cover_title: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            bookmarks: true,
            cover_page: true,
            cover_title: default_cover_title(),
        }
    }
}

/// Concatenate `inputs` into one PDF at `output`.
///
/// Missing inputs are skipped with a warning; it is an error when none
/// remain. Bookmarks are titled `Document {n}: {file name}` with `n`
/// counting every input, skipped or not.
pub fn merge(inputs: &[PathBuf], output: &Path, options: &MergeOptions) -> Result<MergeReport, QuireError> {
    let mut sources = Vec::new();
    for (i, path) in inputs.iter().enumerate() {
        if !path.exists() {
            log::warn!("PDF file not found: {}", path.display());
            continue;
        }
        sources.push((i, path, PdfDocument::load(path)?));
    }
    if sources.is_empty() {
        return Err(QuireError::Validation("No PDF files to merge".into()));
    }

    let mut target = PageSink::new();
    if options.cover_page {
        let cover = merge_cover(inputs, &options.cover_title)?;
        target.append_all(&PdfDocument::load_mem(&cover)?)?;
    }

    let mut marks = Vec::new();
    for (i, path, source) in &sources {
        match target.append_all(source)? {
            Some(first) => marks.push((format!("Document {}: {}", i + 1, file_label(path)), first)),
            None => log::warn!("{} has no pages", path.display()),
        }
    }

    let pages = target.page_count();
    let mut doc = target.finish();
    if options.bookmarks && !marks.is_empty() {
        add_outline(&mut doc, &marks)?;
    }
    let mut info = dictionary! {
        "Producer" => info_string(concat!("quire ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => info_string(&Local::now().format("D:%Y%m%d%H%M%S").to_string()),
    };
    if options.cover_page {
        info.set("Title", info_string(&options.cover_title));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    let size_bytes = save_pdf(&bytes, output)?;
    log::info!("Merged {} PDFs into {} ({} pages)", sources.len(), output.display(), pages);

    Ok(MergeReport {
        output_path: output.to_path_buf(),
        input_files: inputs.to_vec(),
        files_merged: sources.len(),
        pages,
        size_bytes,
    })
}

/// Title page plus a contents section naming each input.
fn merge_cover(inputs: &[PathBuf], title: &str) -> Result<Vec<u8>, QuireError> {
    let listing: Vec<String> = inputs.iter().map(|p| format!("• {}", file_label(p))).collect();
    let mut doc = Document::new(DocumentConfig::default())
        .title(title)
        .meta("Document Type", "Merged Document")
        .meta("Files Merged", inputs.len().to_string())
        .meta("Generated", Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
        .with_fetcher(MemoryFetcher::new());
    let body = format!("Merged Files:\n\n{}", listing.join("\n\n"));
    doc.append_section("Contents", Value::String(body), SectionKind::Text, SectionOptions::default());
    doc.render()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Flat outline: one top-level item per entry, each opening its page.
fn add_outline(doc: &mut PdfDocument, marks: &[(String, ObjectId)]) -> Result<(), QuireError> {
    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = marks.iter().map(|_| doc.new_object_id()).collect();

    for (i, (title, page)) in marks.iter().enumerate() {
        let mut item = dictionary! {
            "Title" => info_string(title),
            "Parent" => outlines_id,
            "Dest" => vec![Object::Reference(*page), "Fit".into()],
        };
        if i > 0 {
            item.set("Prev", item_ids[i - 1]);
        }
        if let Some(next) = item_ids.get(i + 1) {
            item.set("Next", *next);
        }
        doc.objects.insert(item_ids[i], Object::Dictionary(item));
    }

    if let (Some(first), Some(last)) = (item_ids.first(), item_ids.last()) {
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => *first,
                "Last" => *last,
                "Count" => item_ids.len() as i64,
            }),
        );
    }

    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_object_mut(root_id)?.as_dict_mut()?;
    catalog.set("Outlines", outlines_id);
    catalog.set("PageMode", "UseOutlines");
    Ok(())
}

// ============================================================================
// SPLIT
// ============================================================================

/// Split `input` into files of `pages_per_file` pages under `out_dir`.
///
/// Files are named `{stem}_page_{n}.pdf` for single pages and
/// `{stem}_pages_{first}-{last}.pdf` otherwise, numbered from 1.
pub fn split(input: &Path, out_dir: &Path, pages_per_file: usize) -> Result<SplitReport, QuireError> {
    if pages_per_file == 0 {
        return Err(QuireError::Validation("pages_per_file must be at least 1".into()));
    }
    if !input.exists() {
        return Err(QuireError::Validation(format!("File '{}' not found", input.display())));
    }
    let source = PdfDocument::load(input)?;
    let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    fs::create_dir_all(out_dir)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut output_files = Vec::new();
    for (chunk_no, chunk) in pages.chunks(pages_per_file).enumerate() {
        let first = chunk_no * pages_per_file + 1;
        let last = first + chunk.len() - 1;
        let name = if pages_per_file == 1 {
            format!("{}_page_{}.pdf", stem, first)
        } else {
            format!("{}_pages_{}-{}.pdf", stem, first, last)
        };

        let mut sink = PageSink::new();
        sink.append(&source, chunk)?;
        let mut bytes = Vec::new();
        sink.finish().save_to(&mut bytes)?;

        let path = out_dir.join(name);
        save_pdf(&bytes, &path)?;
        output_files.push(path);
    }
    log::info!("Split {} into {} files", input.display(), output_files.len());

    Ok(SplitReport {
        input_file: input.to_path_buf(),
        output_directory: out_dir.to_path_buf(),
        files_created: output_files.len(),
        output_files,
        total_pages: pages.len(),
        pages_per_file,
    })
}

// ============================================================================
// INFO
// ============================================================================

/// Page count, first-page size, encryption flag and Info entries.
pub fn info(path: &Path) -> Result<PdfInfo, QuireError> {
    if !path.exists() {
        return Err(QuireError::Validation(format!("File '{}' not found", path.display())));
    }
    let size_bytes = fs::metadata(path)?.len();
    let doc = PdfDocument::load(path)?;
    let pages = doc.get_pages();

    let page_size = pages.values().next().and_then(|&id| {
        let media = inherited(&doc, id, b"MediaBox")?;
        let coords: Vec<f32> = resolve(&doc, &media)
            .as_array()
            .ok()?
            .iter()
            .filter_map(|o| o.as_float().ok())
            .collect();
        let &[x0, y0, x1, y1] = coords.as_slice() else {
            return None;
        };
        let (width, height) = ((x1 - x0).abs(), (y1 - y0).abs());
        Some(PageSize {
            width,
            height,
            width_inches: width / 72.0,
            height_inches: height / 72.0,
        })
    });

    let mut metadata = BTreeMap::new();
    if let Ok(info) = doc.trailer.get(b"Info").map(|o| resolve(&doc, o)) {
        if let Ok(dict) = info.as_dict() {
            for (key, value) in dict.iter() {
                let key = String::from_utf8_lossy(key).to_lowercase();
                let value = resolve(&doc, value);
                let value = match value {
                    Object::String(..) => lopdf::decode_text_string(value).unwrap_or_default(),
                    Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                    Object::Integer(n) => n.to_string(),
                    Object::Real(n) => n.to_string(),
                    Object::Boolean(b) => b.to_string(),
                    _ => continue,
                };
                metadata.insert(key, value);
            }
        }
    }

    Ok(PdfInfo {
        filename: path.to_path_buf(),
        size_bytes,
        total_pages: pages.len(),
        encrypted: doc.is_encrypted(),
        metadata,
        page_size,
    })
}

// ============================================================================
// PAGE COPYING
// ============================================================================

/// Follow a reference to its object; anything else is returned as is.
fn resolve<'a>(doc: &'a PdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// `key` on the page itself or its nearest page-tree ancestor.
fn inherited(doc: &PdfDocument, page: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Copies objects from one source into the target, each exactly once.
struct Copier<'a> {
    source: &'a PdfDocument,
    target: &'a mut PdfDocument,
    ids: HashMap<ObjectId, ObjectId>,
}

impl<'a> Copier<'a> {
    fn new(source: &'a PdfDocument, target: &'a mut PdfDocument) -> Self {
        Self {
            source,
            target,
            ids: HashMap::new(),
        }
    }

    fn copy(&mut self, id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(&new) = self.ids.get(&id) {
            return Ok(new);
        }
        // Registered before recursing so cycles resolve to the same id.
        let new = self.target.new_object_id();
        self.ids.insert(id, new);
        let obj = self.source.get_object(id)?.clone();
        let obj = self.remap(obj)?;
        self.target.objects.insert(new, obj);
        Ok(new)
    }

    fn remap(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        Ok(match obj {
            Object::Reference(id) => Object::Reference(self.copy(id)?),
            Object::Array(items) => Object::Array(items.into_iter().map(|o| self.remap(o)).collect::<Result<_, _>>()?),
            Object::Dictionary(mut dict) => {
                self.remap_dict(&mut dict)?;
                Object::Dictionary(dict)
            }
            Object::Stream(mut stream) => {
                self.remap_dict(&mut stream.dict)?;
                Object::Stream(stream)
            }
            other => other,
        })
    }

    fn remap_dict(&mut self, dict: &mut Dictionary) -> Result<(), lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            *value = self.remap(std::mem::replace(value, Object::Null))?;
        }
        Ok(())
    }

    /// Copy one page under `parent`, with inherited attributes made local.
    fn copy_page(&mut self, page: ObjectId, parent: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let new = self.target.new_object_id();
        self.ids.insert(page, new);

        let mut dict = self.source.get_dictionary(page)?.clone();
        for key in INHERITED {
            if !dict.has(key) {
                if let Some(value) = inherited(self.source, page, key) {
                    dict.set(key.to_vec(), value);
                }
            }
        }
        dict.remove(b"Parent");
        self.remap_dict(&mut dict)?;
        dict.set("Parent", parent);
        self.target.objects.insert(new, Object::Dictionary(dict));
        Ok(new)
    }
}

/// A target document being filled page by page.
struct PageSink {
    doc: PdfDocument,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageSink {
    fn new() -> Self {
        let mut doc = PdfDocument::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Append `pages` of `source` in order. Returns the first new page id.
    fn append(&mut self, source: &PdfDocument, pages: &[ObjectId]) -> Result<Option<ObjectId>, lopdf::Error> {
        let mut copier = Copier::new(source, &mut self.doc);
        let mut first = None;
        for &page in pages {
            let id = copier.copy_page(page, self.pages_id)?;
            first.get_or_insert(id);
            self.kids.push(id);
        }
        Ok(first)
    }

    fn append_all(&mut self, source: &PdfDocument) -> Result<Option<ObjectId>, lopdf::Error> {
        let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        self.append(source, &pages)
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn finish(mut self) -> PdfDocument {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.kids.len() as i64,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}
