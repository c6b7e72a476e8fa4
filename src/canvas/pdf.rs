//! PDF code generation from recorded page canvases.
//!
//! One shared resources dictionary serves every page: base-14 fonts as
//! `/F1..`, images as `/Im1..` (stored once per [`RasterImage::key`]) and
//! opacity states as `/GS1..`. Content streams are Flate-compressed.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::{DrawOp, PageCanvas, RasterImage, Stroke};
use crate::color::Color;
use crate::error::QuireError;
use crate::text::{Font, to_win_ansi};

/// Bezier control-point factor for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Document-level metadata written to the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Default)]
struct Resources {
    fonts: BTreeMap<Font, String>,
    images: HashMap<String, (String, ObjectId)>,
    alphas: BTreeMap<u16, String>,
}

impl Resources {
    fn font_name(&self, font: Font) -> Object {
        let name = self.fonts.get(&font).map(String::as_str).unwrap_or("F1");
        Object::Name(name.as_bytes().to_vec())
    }

    fn alpha_key(alpha: f32) -> u16 {
        (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16
    }

    /// Collect every font, image and alpha the pages reference.
    fn collect(&mut self, doc: &mut Document, pages: &[PageCanvas]) -> Result<(), QuireError> {
        for op in pages.iter().flat_map(|p| p.ops()) {
            match op {
                DrawOp::Text { font, .. } => {
                    let next = format!("F{}", self.fonts.len() + 1);
                    self.fonts.entry(*font).or_insert(next);
                }
                DrawOp::SetAlpha(a) => {
                    let next = format!("GS{}", self.alphas.len() + 1);
                    self.alphas.entry(Self::alpha_key(*a)).or_insert(next);
                }
                DrawOp::Image { image, .. } => {
                    if !self.images.contains_key(&image.key) {
                        let id = add_image_xobject(doc, image)?;
                        let name = format!("Im{}", self.images.len() + 1);
                        self.images.insert(image.key.clone(), (name, id));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn to_dictionary(&self, doc: &mut Document) -> Dictionary {
        let mut fonts = Dictionary::new();
        for (font, name) in &self.fonts {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.pdf_name(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(name.as_bytes(), id);
        }

        let mut xobjects = Dictionary::new();
        for (name, id) in self.images.values() {
            xobjects.set(name.as_bytes(), *id);
        }

        let mut states = Dictionary::new();
        for (key, name) in &self.alphas {
            let alpha = *key as f32 / 1000.0;
            states.set(
                name.as_bytes(),
                dictionary! { "Type" => "ExtGState", "ca" => alpha, "CA" => alpha },
            );
        }

        dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
            "ExtGState" => states,
        }
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>, QuireError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn add_image_xobject(doc: &mut Document, image: &RasterImage) -> Result<ObjectId, QuireError> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(alpha) = &image.alpha {
        let smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compress(alpha)?,
        );
        let smask_id = doc.add_object(smask);
        dict.set("SMask", smask_id);
    }
    Ok(doc.add_object(Stream::new(dict, compress(&image.rgb)?)))
}

// ============================================================================
// CONTENT STREAM
// ============================================================================

fn op(name: &str, operands: Vec<Object>) -> Operation {
    Operation::new(name, operands)
}

fn color_operands(c: Color) -> Vec<Object> {
    vec![c.r.into(), c.g.into(), c.b.into()]
}

fn apply_paint(ops: &mut Vec<Operation>, fill: Option<Color>, stroke: Option<Stroke>) {
    if let Some(c) = fill {
        ops.push(op("rg", color_operands(c)));
    }
    if let Some(s) = stroke {
        apply_stroke(ops, s);
    }
}

fn apply_stroke(ops: &mut Vec<Operation>, s: Stroke) {
    ops.push(op("RG", color_operands(s.color)));
    ops.push(op("w", vec![s.width.into()]));
    if let Some((on, off)) = s.dash {
        ops.push(op("d", vec![Object::Array(vec![on.into(), off.into()]), Object::Integer(0)]));
    }
}

/// Paint operator for a closed path.
fn paint_op(fill: Option<Color>, stroke: Option<Stroke>) -> &'static str {
    match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
    }
}

fn round_rect_path(ops: &mut Vec<Operation>, x: f32, y: f32, w: f32, h: f32, r: f32) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let k = r * KAPPA;
    let (x2, y2) = (x + w, y + h);
    ops.push(op("m", vec![(x + r).into(), y.into()]));
    ops.push(op("l", vec![(x2 - r).into(), y.into()]));
    ops.push(op(
        "c",
        vec![(x2 - r + k).into(), y.into(), x2.into(), (y + r - k).into(), x2.into(), (y + r).into()],
    ));
    ops.push(op("l", vec![x2.into(), (y2 - r).into()]));
    ops.push(op(
        "c",
        vec![x2.into(), (y2 - r + k).into(), (x2 - r + k).into(), y2.into(), (x2 - r).into(), y2.into()],
    ));
    ops.push(op("l", vec![(x + r).into(), y2.into()]));
    ops.push(op(
        "c",
        vec![(x + r - k).into(), y2.into(), x.into(), (y2 - r + k).into(), x.into(), (y2 - r).into()],
    ));
    ops.push(op("l", vec![x.into(), (y + r).into()]));
    ops.push(op(
        "c",
        vec![x.into(), (y + r - k).into(), (x + r - k).into(), y.into(), (x + r).into(), y.into()],
    ));
    ops.push(op("h", vec![]));
}

fn circle_path(ops: &mut Vec<Operation>, cx: f32, cy: f32, r: f32) {
    let k = r * KAPPA;
    ops.push(op("m", vec![(cx + r).into(), cy.into()]));
    ops.push(op(
        "c",
        vec![(cx + r).into(), (cy + k).into(), (cx + k).into(), (cy + r).into(), cx.into(), (cy + r).into()],
    ));
    ops.push(op(
        "c",
        vec![(cx - k).into(), (cy + r).into(), (cx - r).into(), (cy + k).into(), (cx - r).into(), cy.into()],
    ));
    ops.push(op(
        "c",
        vec![(cx - r).into(), (cy - k).into(), (cx - k).into(), (cy - r).into(), cx.into(), (cy - r).into()],
    ));
    ops.push(op(
        "c",
        vec![(cx + k).into(), (cy - r).into(), (cx + r).into(), (cy - k).into(), (cx + r).into(), cy.into()],
    ));
    ops.push(op("h", vec![]));
}

fn encode_page(page: &PageCanvas, res: &Resources) -> Vec<Operation> {
    let mut ops = Vec::new();
    for draw in page.ops() {
        match draw {
            DrawOp::Save => ops.push(op("q", vec![])),
            DrawOp::Restore => ops.push(op("Q", vec![])),
            DrawOp::Translate { dx, dy } => ops.push(op(
                "cm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), (*dx).into(), (*dy).into()],
            )),
            DrawOp::Rotate { degrees } => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                ops.push(op(
                    "cm",
                    vec![cos.into(), sin.into(), (-sin).into(), cos.into(), 0.into(), 0.into()],
                ));
            }
            DrawOp::SetAlpha(a) => {
                if let Some(name) = res.alphas.get(&Resources::alpha_key(*a)) {
                    ops.push(op("gs", vec![Object::Name(name.as_bytes().to_vec())]));
                }
            }
            DrawOp::Rect { x, y, w, h, fill, stroke } => {
                ops.push(op("q", vec![]));
                apply_paint(&mut ops, *fill, *stroke);
                ops.push(op("re", vec![(*x).into(), (*y).into(), (*w).into(), (*h).into()]));
                ops.push(op(paint_op(*fill, *stroke), vec![]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::RoundRect { x, y, w, h, radius, fill, stroke } => {
                ops.push(op("q", vec![]));
                apply_paint(&mut ops, *fill, *stroke);
                round_rect_path(&mut ops, *x, *y, *w, *h, *radius);
                ops.push(op(paint_op(*fill, *stroke), vec![]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::Line { x1, y1, x2, y2, stroke } => {
                ops.push(op("q", vec![]));
                apply_stroke(&mut ops, *stroke);
                ops.push(op("m", vec![(*x1).into(), (*y1).into()]));
                ops.push(op("l", vec![(*x2).into(), (*y2).into()]));
                ops.push(op("S", vec![]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::Circle { cx, cy, r, fill, stroke } => {
                ops.push(op("q", vec![]));
                apply_paint(&mut ops, *fill, *stroke);
                circle_path(&mut ops, *cx, *cy, *r);
                ops.push(op(paint_op(*fill, *stroke), vec![]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::Polygon { points, fill, stroke } => {
                let Some(((x0, y0), rest)) = points.split_first() else {
                    continue;
                };
                ops.push(op("q", vec![]));
                apply_paint(&mut ops, *fill, *stroke);
                ops.push(op("m", vec![(*x0).into(), (*y0).into()]));
                for (x, y) in rest {
                    ops.push(op("l", vec![(*x).into(), (*y).into()]));
                }
                ops.push(op("h", vec![]));
                ops.push(op(paint_op(*fill, *stroke), vec![]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::Text { x, y, font, size, color, text } => {
                ops.push(op("BT", vec![]));
                ops.push(op("Tf", vec![res.font_name(*font), (*size).into()]));
                ops.push(op("rg", color_operands(*color)));
                ops.push(op("Td", vec![(*x).into(), (*y).into()]));
                ops.push(op("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]));
                ops.push(op("ET", vec![]));
            }
            DrawOp::Image { image, x, y, w, h } => {
                if let Some((name, _)) = res.images.get(&image.key) {
                    ops.push(op("q", vec![]));
                    ops.push(op(
                        "cm",
                        vec![(*w).into(), 0.into(), 0.into(), (*h).into(), (*x).into(), (*y).into()],
                    ));
                    ops.push(op("Do", vec![Object::Name(name.as_bytes().to_vec())]));
                    ops.push(op("Q", vec![]));
                }
            }
            DrawOp::Link { .. } => {}
        }
    }
    ops
}

fn link_annotations(doc: &mut Document, page: &PageCanvas) -> Vec<Object> {
    page.ops()
        .iter()
        .filter_map(|draw| match draw {
            DrawOp::Link { x, y, w, h, url } => Some(doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![(*x).into(), (*y).into(), (x + w).into(), (y + h).into()],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::String(url.as_bytes().to_vec(), StringFormat::Literal),
                },
            })),
            _ => None,
        })
        .map(Object::Reference)
        .collect()
}

pub(crate) fn info_string(s: &str) -> Object {
    Object::String(to_win_ansi(s), StringFormat::Literal)
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// Build a complete PDF from `pages` and return its bytes.
pub fn render_pdf(pages: &[PageCanvas], info: &DocInfo) -> Result<Vec<u8>, QuireError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources_id = doc.new_object_id();

    let mut res = Resources::default();
    res.collect(&mut doc, pages)?;
    if res.fonts.is_empty() {
        res.fonts.insert(Font::Helvetica, "F1".into());
    }
    let resources = res.to_dictionary(&mut doc);
    doc.objects.insert(resources_id, Object::Dictionary(resources));

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: encode_page(page, &res),
        };
        let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, compress(&content.encode()?)?);
        let content_id = doc.add_object(stream);

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        let annots = link_annotations(&mut doc, page);
        if !annots.is_empty() {
            page_dict.set("Annots", Object::Array(annots));
        }
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut info_dict = dictionary! {
        "Producer" => info_string(concat!("quire ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => info_string(&chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
    };
    if let Some(title) = &info.title {
        info_dict.set("Title", info_string(title));
    }
    if let Some(author) = &info.author {
        info_dict.set("Author", info_string(author));
    }
    if let Some(subject) = &info.subject {
        info_dict.set("Subject", info_string(subject));
    }
    let info_id = doc.add_object(info_dict);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}
