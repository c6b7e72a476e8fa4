//! # Pagination
//!
//! Flows a story through the frames of successive pages and records each
//! page as a [`PageCanvas`].
//!
//! Frames come from [`LayoutConfig::frames`], one per column. Within a frame
//! elements stack downward from the top:
//!
//! - space before is dropped at the top of a frame
//! - paragraphs split by line, tables by row (header rows repeat)
//! - a keep-together group that does not fit moves whole to the next frame,
//!   and is only broken up when it is taller than an empty frame
//! - a page break ends the page only once something follows it, so a
//!   trailing break never produces a blank page
//! - an element taller than an empty frame is drawn anyway, overflowing,
//!   with a warning
//!
//! Page furniture is painted after the whole story is placed, so the footer
//! can print the final page count. It goes underneath the body.

use std::collections::VecDeque;

use crate::canvas::{DrawOp, PageCanvas};
use crate::config::LayoutConfig;
use crate::decoration::{DecorationPipeline, PageInfo};
use crate::element::Element;
use crate::error::QuireError;

/// Slack for accumulated float error when comparing heights.
const EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    bottom: f32,
    width: f32,
    top: f32,
}

/// Outcome of laying out one story.
#[derive(Debug, Default)]
pub struct Pagination {
    pub pages: Vec<PageCanvas>,
    /// Elements drawn past the bottom of their frame.
    pub overflowed: usize,
}

struct Paginator {
    frames: Vec<Frame>,
    page_w: f32,
    page_h: f32,
    done: Vec<Vec<DrawOp>>,
    canvas: PageCanvas,
    frame: usize,
    cursor: f32,
    at_top: bool,
    page_dirty: bool,
    break_pending: bool,
    overflowed: usize,
}

impl Paginator {
    fn new(layout: &LayoutConfig) -> Result<Self, QuireError> {
        let frames: Vec<Frame> = layout
            .frames()
            .into_iter()
            .map(|(x, y, w, h)| Frame {
                x,
                bottom: y,
                width: w,
                top: y + h,
            })
            .collect();
        let Some(first) = frames.first().copied() else {
            return Err(QuireError::Layout("page has no frames".into()));
        };
        if first.width <= 0.0 || first.top <= first.bottom {
            return Err(QuireError::Layout(format!(
                "frame {:.1}x{:.1} has no room for content",
                first.width,
                first.top - first.bottom
            )));
        }
        let (page_w, page_h) = layout.page_dimensions();
        Ok(Self {
            frames,
            page_w,
            page_h,
            done: Vec::new(),
            canvas: PageCanvas::new(page_w, page_h),
            frame: 0,
            cursor: first.top,
            at_top: true,
            page_dirty: false,
            break_pending: false,
            overflowed: 0,
        })
    }

    fn current(&self) -> Frame {
        self.frames[self.frame]
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.current().bottom
    }

    fn new_page(&mut self) {
        let canvas = std::mem::replace(&mut self.canvas, PageCanvas::new(self.page_w, self.page_h));
        self.done.push(canvas.into_ops());
        self.frame = 0;
        self.cursor = self.current().top;
        self.at_top = true;
        self.page_dirty = false;
    }

    fn next_frame(&mut self) {
        if self.frame + 1 < self.frames.len() {
            self.frame += 1;
            self.cursor = self.current().top;
            self.at_top = true;
        } else {
            self.new_page();
        }
    }

    fn place(&mut self, element: &Element, gap: f32, height: f32) {
        let f = self.current();
        element.draw(&mut self.canvas, f.x, self.cursor - gap, f.width);
        self.cursor -= gap + height + element.space_after();
        self.at_top = false;
        self.page_dirty = true;
    }

    fn run(&mut self, story: impl IntoIterator<Item = Element>) {
        let mut queue: VecDeque<Element> = story.into_iter().collect();

        while let Some(element) = queue.pop_front() {
            if element.is_page_break() {
                if self.page_dirty {
                    self.break_pending = true;
                }
                continue;
            }
            if self.break_pending {
                self.break_pending = false;
                self.new_page();
            }

            let width = self.current().width;
            let gap = if self.at_top { 0.0 } else { element.space_before() };
            let height = element.measure(width).height;
            let room = self.remaining();

            if gap + height <= room + EPSILON {
                self.place(&element, gap, height);
                continue;
            }

            if let Element::Spacer(_) = element {
                // a gap that runs off the frame just ends it
                self.next_frame();
                continue;
            }

            if let Some((head, tail)) = element.split(width, room - gap) {
                let head_h = head.measure(width).height;
                self.place(&head, gap, head_h);
                queue.push_front(tail);
                self.next_frame();
                continue;
            }

            if !self.at_top {
                queue.push_front(element);
                self.next_frame();
                continue;
            }

            match element {
                Element::KeepTogether(children) => {
                    log::debug!("keep-together group taller than a frame, letting it break");
                    for child in children.into_iter().rev() {
                        queue.push_front(child);
                    }
                }
                other => {
                    log::warn!(
                        "{} is {:.1}pt tall but a frame holds {:.1}pt, drawing it overflowing",
                        other.kind(),
                        height,
                        room
                    );
                    self.place(&other, 0.0, height);
                    self.overflowed += 1;
                    self.next_frame();
                }
            }
        }
    }

    fn finish(mut self, decorations: &DecorationPipeline) -> Pagination {
        if self.page_dirty || self.done.is_empty() {
            let last = std::mem::replace(&mut self.canvas, PageCanvas::new(self.page_w, self.page_h));
            self.done.push(last.into_ops());
        }

        let total = self.done.len();
        let pages = self
            .done
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let mut canvas = PageCanvas::new(self.page_w, self.page_h);
                let info = PageInfo {
                    number: i + 1,
                    total,
                    width: self.page_w,
                    height: self.page_h,
                };
                decorations.paint(&mut canvas, &info);
                canvas.extend(body);
                canvas
            })
            .collect();

        Pagination {
            pages,
            overflowed: self.overflowed,
        }
    }
}

/// Lay `story` out on pages shaped by `layout`, painting `decorations`
/// beneath every page.
pub fn paginate(
    story: impl IntoIterator<Item = Element>,
    layout: &LayoutConfig,
    decorations: &DecorationPipeline,
) -> Result<Pagination, QuireError> {
    let mut paginator = Paginator::new(layout)?;
    paginator.run(story);
    let result = paginator.finish(decorations);
    log::debug!("paginated into {} page(s)", result.pages.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentConfig, FooterConfig, Margins};
    use crate::canvas::RasterImage;
    use crate::element::{ImageBlock, Paragraph, Table};
    use std::sync::Arc;
    use crate::fetch::MemoryFetcher;
    use crate::style::TextStyle;
    use crate::text::Font;
    use pretty_assertions::assert_eq;

    fn no_furniture() -> DecorationPipeline {
        DecorationPipeline::new(&DocumentConfig::default(), &MemoryFetcher::new())
    }

    fn para(text: &str) -> Element {
        let style = TextStyle::new(Font::Courier, 10.0).leading(12.0).spacing(6.0, 0.0);
        Paragraph::plain(text, &style).into()
    }

    /// A layout whose single frame is exactly `h` points tall.
    fn short_page(h: f32) -> LayoutConfig {
        let mut layout = LayoutConfig::default();
        let top_bottom = (792.0 - h) / 2.0;
        layout.margins = Margins {
            top: top_bottom,
            bottom: top_bottom,
            left: 72.0,
            right: 72.0,
        };
        layout
    }

    fn texts(page: &PageCanvas) -> Vec<(f32, String)> {
        page.ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, text, .. } => Some((*y, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn paginate_plain(story: Vec<Element>, layout: &LayoutConfig) -> Pagination {
        paginate(story, layout, &no_furniture()).unwrap()
    }

    #[test]
    fn test_space_before_dropped_at_frame_top() {
        let layout = LayoutConfig::default();
        let out = paginate_plain(vec![para("a"), para("b")], &layout);
        let lines = texts(&out.pages[0]);
        let top = 792.0 - 72.0;
        // first line sits flush with the frame top, the second after its gap
        assert!(lines[0].0 > top - 12.0 && lines[0].0 < top);
        assert!((lines[0].0 - lines[1].0 - 18.0).abs() < 1e-3);
    }

    #[test]
    fn test_page_breaks_are_lazy() {
        let layout = LayoutConfig::default();
        let story = vec![
            Element::PageBreak,
            para("one"),
            Element::PageBreak,
            Element::PageBreak,
            para("two"),
            Element::PageBreak,
        ];
        let out = paginate_plain(story, &layout);
        assert_eq!(out.pages.len(), 2);
        assert_eq!(texts(&out.pages[1])[0].1, "two");
    }

    #[test]
    fn test_empty_story_is_one_blank_page() {
        let out = paginate_plain(Vec::new(), &LayoutConfig::default());
        assert_eq!(out.pages.len(), 1);
        assert!(out.pages[0].ops().is_empty());
    }

    #[test]
    fn test_paragraph_splits_across_pages() {
        let layout = short_page(60.0);
        let long = vec!["word"; 300].join(" ");
        let out = paginate_plain(vec![para(&long)], &layout);
        assert!(out.pages.len() > 1);
        let all: usize = out.pages.iter().map(|p| texts(p).len()).sum();
        let single = paginate_plain(vec![para(&long)], &LayoutConfig::default());
        assert_eq!(all, texts(&single.pages[0]).len());
        assert_eq!(out.overflowed, 0);
    }

    #[test]
    fn test_table_header_repeats_on_split() {
        let layout = short_page(80.0);
        let mut rows = vec![vec!["Name".to_string(), "Qty".to_string()]];
        rows.extend((0..12).map(|i| vec![format!("item{}", i), i.to_string()]));
        let table = Table::from_text(&rows).repeat_rows(1);
        let out = paginate_plain(vec![table.into()], &layout);
        assert!(out.pages.len() > 1);
        for page in &out.pages {
            assert!(texts(page).iter().any(|(_, t)| t == "Name"));
        }
    }

    #[test]
    fn test_keep_together_moves_to_next_page() {
        let layout = short_page(60.0);
        let story = vec![
            para("lead"),
            Element::Spacer(20.0),
            Element::KeepTogether(vec![para("k1"), para("k2")]),
        ];
        let out = paginate_plain(story, &layout);
        assert_eq!(out.pages.len(), 2);
        let second: Vec<String> = texts(&out.pages[1]).into_iter().map(|(_, t)| t).collect();
        assert_eq!(second, vec!["k1", "k2"]);
    }

    #[test]
    fn test_oversized_group_breaks_up() {
        let layout = short_page(30.0);
        let group = Element::KeepTogether(vec![para("k1"), para("k2"), para("k3")]);
        let out = paginate_plain(vec![group], &layout);
        assert!(out.pages.len() >= 2);
        assert_eq!(out.overflowed, 0);
    }

    #[test]
    fn test_oversized_spacer_ends_frame_and_element_overflows() {
        let layout = short_page(40.0);
        let out = paginate_plain(vec![Element::Spacer(100.0), para("after")], &layout);
        assert_eq!(out.pages.len(), 2);
        assert_eq!(texts(&out.pages[1])[0].1, "after");

        let raster = RasterImage::from_dynamic("tall", &image::DynamicImage::new_rgb8(2, 2));
        let tall: Element = ImageBlock::new(Arc::new(raster), 10.0, 100.0).into();
        let out = paginate_plain(vec![tall, para("next")], &layout);
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.overflowed, 1);
    }

    #[test]
    fn test_columns_fill_before_new_page() {
        let mut layout = short_page(40.0);
        layout.columns = 2;
        layout.column_gap = 20.0;
        let story: Vec<Element> = (0..4).map(|i| para(&format!("p{}", i))).collect();
        let out = paginate_plain(story, &layout);
        let first = texts(&out.pages[0]);
        assert!(first.len() >= 3);
        let xs: Vec<f32> = out.pages[0]
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert!(xs.iter().any(|x| *x > 300.0));
    }

    #[test]
    fn test_furniture_knows_total_and_sits_underneath() {
        let mut config = DocumentConfig::default();
        config.footer = Some(FooterConfig {
            page_number_format: "{page}/{total}".into(),
            ..Default::default()
        });
        let decorations = DecorationPipeline::new(&config, &MemoryFetcher::new());
        let story = vec![para("a"), Element::PageBreak, para("b")];
        let out = paginate(story, &config.layout, &decorations).unwrap();
        assert_eq!(out.pages.len(), 2);
        let second = texts(&out.pages[1]);
        assert_eq!(second[0].1, "2/2");
        assert_eq!(second[1].1, "b");
    }

    #[test]
    fn test_degenerate_frame_is_an_error() {
        let mut layout = LayoutConfig::default();
        layout.margins.left = 400.0;
        layout.margins.right = 400.0;
        assert!(matches!(
            paginate(Vec::new(), &layout, &no_furniture()),
            Err(QuireError::Layout(_))
        ));
    }
}
