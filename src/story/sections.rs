//! Splitting loose content blocks into titled sections with breaks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Story, lenient_indices};
use crate::element::{Element, Paragraph, Role};
use crate::style::StyleSheet;

/// One item of a list block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Text(String),
    Element(Element),
}

/// A section's worth of content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Empty,
    Text(String),
    Element(Element),
    /// Flattened in order; `None` entries are dropped.
    List(Vec<Option<BlockItem>>),
}

impl Block {
    /// Blocks from a JSON array: strings become text, arrays become lists
    /// of text, `null` stays empty. Anything but an array yields `None`.
    pub fn list_from_value(value: &Value) -> Option<Vec<Block>> {
        let Some(items) = value.as_array() else {
            log::warn!("sections must be a list, got {}", value);
            return None;
        };
        Some(items.iter().enumerate().map(|(i, v)| Block::from_value(i, v)).collect())
    }

    fn from_value(index: usize, value: &Value) -> Block {
        match value {
            Value::Null => Block::Empty,
            Value::String(s) => Block::Text(s.clone()),
            Value::Array(items) => Block::List(
                items
                    .iter()
                    .map(|v| match v {
                        Value::Null => None,
                        Value::String(s) => Some(BlockItem::Text(s.clone())),
                        other => Some(BlockItem::Text(other.to_string())),
                    })
                    .collect(),
            ),
            Value::Number(n) => Block::Text(n.to_string()),
            other => {
                log::warn!("section {} has unsupported content {}, skipping", index, other);
                Block::Empty
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakOptions {
    pub break_between_all: bool,
    /// Consulted only when `break_between_all` is off.
    #[serde(deserialize_with = "lenient_indices")]
    pub break_after_indices: Vec<usize>,
    pub no_breaks: bool,
    pub min_content_for_break: usize,
    pub section_titles: Vec<String>,
}

impl Default for BreakOptions {
    fn default() -> Self {
        Self {
            break_between_all: true,
            break_after_indices: Vec::new(),
            no_breaks: false,
            min_content_for_break: 1,
            section_titles: Vec::new(),
        }
    }
}

impl BreakOptions {
    fn wants_break_after(&self, index: usize) -> bool {
        !self.no_breaks && (self.break_between_all || self.break_after_indices.contains(&index))
    }
}

/// Append `blocks` to `story`, each optionally titled, with page breaks
/// between them as `options` allow. Returns the number of breaks added.
pub fn split_into_sections(
    story: &mut Story,
    blocks: Vec<Block>,
    options: &BreakOptions,
    sheet: &StyleSheet,
) -> usize {
    let count = blocks.len();
    let mut breaks = 0;
    for (i, block) in blocks.into_iter().enumerate() {
        if let Some(title) = options.section_titles.get(i).filter(|t| !t.is_empty()) {
            story.push(Paragraph::new(title, &sheet.heading2).role(Role::Heading(2)).into());
            story.push(Element::Spacer(12.0));
        }

        let before = story.content_len();
        match block {
            Block::Empty => {}
            Block::Text(text) => story.push(Paragraph::new(&text, &sheet.normal).into()),
            Block::Element(e) => story.push(e),
            Block::List(items) => {
                for item in items.into_iter().flatten() {
                    match item {
                        BlockItem::Text(text) => story.push(Paragraph::new(&text, &sheet.normal).into()),
                        BlockItem::Element(e) => story.push(e),
                    }
                }
            }
        }
        let emitted = story.content_len() - before;

        let last = i + 1 == count;
        if !last && options.wants_break_after(i) && emitted >= options.min_content_for_break && story.push_page_break() {
            breaks += 1;
        }
    }
    breaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use serde_json::json;

    fn sheet() -> StyleSheet {
        StyleSheet::resolve(&DocumentConfig::default())
    }

    #[test]
    fn test_breaks_between_all_but_last() {
        let mut story = Story::new();
        let blocks = vec![Block::Text("a".into()), Block::Text("b".into()), Block::Text("c".into())];
        assert_eq!(split_into_sections(&mut story, blocks, &BreakOptions::default(), &sheet()), 2);
        assert_eq!(story.len(), 5);
        assert!(!story.iter().last().is_some_and(Element::is_page_break));
    }

    #[test]
    fn test_titles_and_selected_breaks() {
        let mut story = Story::new();
        let options = BreakOptions {
            break_between_all: false,
            break_after_indices: vec![1],
            section_titles: vec!["One".into(), String::new(), "Three".into()],
            ..Default::default()
        };
        let blocks = vec![Block::Text("a".into()), Block::Text("b".into()), Block::Text("c".into())];
        assert_eq!(split_into_sections(&mut story, blocks, &options, &sheet()), 1);
        let kinds: Vec<&str> = story.iter().map(Element::kind).collect();
        assert_eq!(
            kinds,
            vec!["paragraph", "spacer", "paragraph", "paragraph", "page_break", "paragraph", "spacer", "paragraph"]
        );
    }

    #[test]
    fn test_min_content_blocks_break() {
        let mut story = Story::new();
        let options = BreakOptions {
            min_content_for_break: 2,
            ..Default::default()
        };
        let blocks = vec![
            Block::Text("short".into()),
            Block::List(vec![Some(BlockItem::Text("x".into())), None, Some(BlockItem::Text("y".into()))]),
            Block::Text("end".into()),
        ];
        assert_eq!(split_into_sections(&mut story, blocks, &options, &sheet()), 1);
        assert_eq!(story.content_len(), 4);
    }

    #[test]
    fn test_no_breaks() {
        let mut story = Story::new();
        let options = BreakOptions {
            no_breaks: true,
            ..Default::default()
        };
        let blocks = vec![Block::Text("a".into()), Block::Text("b".into())];
        assert_eq!(split_into_sections(&mut story, blocks, &options, &sheet()), 0);
    }

    #[test]
    fn test_options_drop_bad_indices() {
        let options: BreakOptions =
            serde_json::from_value(json!({"break_between_all": false, "break_after_indices": [0, "x", -1, "2"]}))
                .unwrap();
        assert_eq!(options.break_after_indices, vec![0, 2]);
        assert!(!options.break_between_all);
        assert_eq!(options.min_content_for_break, 1);
    }

    #[test]
    fn test_blocks_from_json() {
        assert!(Block::list_from_value(&json!("nope")).is_none());
        let blocks = Block::list_from_value(&json!(["a", ["b", null, 3], null])).unwrap();
        assert_eq!(blocks[0], Block::Text("a".into()));
        assert_eq!(
            blocks[1],
            Block::List(vec![Some(BlockItem::Text("b".into())), None, Some(BlockItem::Text("3".into()))])
        );
        assert_eq!(blocks[2], Block::Empty);
    }
}
