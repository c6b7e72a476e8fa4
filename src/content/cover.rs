//! Cover page: logo, framed title, subtitle, ornament and an info block,
//! kept on one page and followed by a page break.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::boxes::Frame;
use super::media::load_image;
use super::{ContentMeta, Process, non_blank};
use crate::canvas::Stroke;
use crate::color::Color;
use crate::config::{HAlign, INCH};
use crate::context::RenderContext;
use crate::element::{Element, ImageBlock, Paragraph, Role, VAlign};
use crate::error::Skip;
use crate::primitives::Ornament;
use crate::style::TextStyle;
use crate::text::Font;

const NAVY: Color = Color::rgb(0.05, 0.25, 0.45);
const GOLD: Color = Color::rgb(0.8, 0.7, 0.4);
const BOX_WIDTH: f32 = 6.5 * INCH;
const LOGO_MAX: f32 = 250.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverPage {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub contact: String,
    /// `YYYY-MM-DD` is shown long-form; anything else verbatim. Today when unset.
    pub date: Option<String>,
    pub logo_path: Option<String>,
    pub logo_url: Option<String>,
    pub logo: Option<String>,
}

impl CoverPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    fn logo_source(&self) -> Option<&str> {
        [&self.logo_path, &self.logo_url, &self.logo]
            .into_iter()
            .find_map(|s| s.as_deref().and_then(non_blank))
    }

    pub fn published(&self) -> String {
        match self.date.as_deref().and_then(non_blank) {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.format("%B %d, %Y").to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => Local::now().format("%B %d, %Y").to_string(),
        }
    }

    fn logo(&self, source: &str, ctx: &RenderContext) -> Vec<Element> {
        match load_image(source, ctx) {
            Ok(image) => {
                let block = ImageBlock::fit_within(image, LOGO_MAX, LOGO_MAX).align(HAlign::Center);
                let frame = Frame::new(Some(Color::rgb(0.1, 0.45, 0.65)), Some(Stroke::solid(NAVY, 3.0)), 12.0, 12.0)
                    .width(BOX_WIDTH);
                vec![frame.wrap(vec![block.into()]), Element::Spacer(20.0)]
            }
            Err(e) => {
                log::warn!("Logo loading failed: {}", e);
                vec![Element::Spacer(30.0)]
            }
        }
    }

    fn info_block(&self) -> Element {
        let style = TextStyle::new(Font::TimesRoman, 18.0)
            .leading(22.0)
            .color(Color::gray(0.2));
        let mut lines = Vec::new();
        if let Some(author) = non_blank(&self.author) {
            lines.push(format!("**Prepared by:** {}", author));
        }
        if let Some(contact) = non_blank(&self.contact) {
            lines.push(format!("**Contact:** {}", contact));
        }
        lines.push(format!("**Published:** {}", self.published()));

        let flow = lines.iter().map(|l| Paragraph::new(l, &style).into()).collect();
        Frame::new(Some(Color::rgb(0.97, 0.97, 0.98)), Some(Stroke::solid(NAVY, 1.5)), 12.0, 10.0)
            .width(BOX_WIDTH)
            .valign(VAlign::Middle)
            .wrap(flow)
    }
}

impl ContentMeta for CoverPage {
    fn label() -> &'static str {
        "Cover Page"
    }
}

impl Process for CoverPage {
    fn process(&self, ctx: &RenderContext) -> Result<Vec<Element>, Skip> {
        let mut cover = Vec::new();
        if let Some(source) = self.logo_source() {
            cover.extend(self.logo(source, ctx));
        }

        if let Some(title) = non_blank(&self.title) {
            let style = TextStyle::new(Font::TimesBold, 42.0)
                .leading(48.0)
                .color(NAVY)
                .align(HAlign::Center);
            let para = Paragraph::new(title, &style).role(Role::Title);
            let frame = Frame::new(Some(Color::rgb(0.95, 0.95, 0.97)), Some(Stroke::solid(NAVY, 2.0)), 15.0, 10.0)
                .width(BOX_WIDTH);
            cover.push(frame.wrap(vec![para.into()]));
            cover.push(Element::Spacer(15.0));
        }

        if let Some(subtitle) = non_blank(&self.subtitle) {
            let style = TextStyle::new(Font::TimesItalic, 22.0)
                .leading(28.0)
                .color(Color::gray(0.3))
                .align(HAlign::Center);
            cover.push(Paragraph::new(subtitle, &style).into());
            cover.push(Element::Spacer(20.0));
        }

        cover.push(Element::Primitive(Ornament::new(GOLD).into()));
        cover.push(Element::Spacer(20.0));
        cover.push(self.info_block());
        cover.push(Element::Spacer(30.0));

        Ok(vec![Element::KeepTogether(cover), Element::PageBreak])
    }
}
