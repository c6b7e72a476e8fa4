//! # Story
//!
//! The ordered sequence of elements a document paginates.
//!
//! Content lives in an append-only arena; page breaks are kept apart as a
//! set of *gaps*. Gap `i` sits just before content element `i`, and gap
//! `len` sits after the last one. Iterating the story materializes the
//! breaks in place, so callers see one flat sequence, and the indices
//! taken by [`Story::insert_page_breaks`] address that flat sequence.
//!
//! Two invariants hold by construction: there is never a leading break
//! (gap 0 is refused) and never two adjacent breaks (a gap holds at most
//! one break).
//!
//! ```
//! use quire::element::Element;
//! use quire::story::Story;
//!
//! let mut story = Story::new();
//! story.extend([Element::Spacer(1.0), Element::Spacer(2.0), Element::Spacer(3.0)]);
//! assert_eq!(story.insert_page_breaks(&[0, 1, 2, 2, 9]), 2);
//! assert_eq!(story.len(), 5);
//! ```

mod sections;

pub use sections::{Block, BlockItem, BreakOptions, split_into_sections};

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::element::{Element, Role};

static PAGE_BREAK: Element = Element::PageBreak;

#[derive(Debug, Clone, Default)]
pub struct Story {
    content: Vec<Element>,
    breaks: BTreeSet<usize>,
}

/// Conditions that place page breaks automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakPolicy {
    /// Story indices, as for [`Story::insert_page_breaks`].
    #[serde(deserialize_with = "lenient_indices")]
    pub custom_positions: Vec<i64>,
    /// Break after every heading.
    pub after_headings: bool,
    /// Break before every table.
    pub before_tables: bool,
    /// Force a break once this many elements share a page.
    pub max_elements_per_page: Option<usize>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element. A [`Element::PageBreak`] becomes a break at the
    /// current end instead of content.
    pub fn push(&mut self, element: Element) {
        if element.is_page_break() {
            self.push_page_break();
        } else {
            self.content.push(element);
        }
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        for e in elements {
            self.push(e);
        }
    }

    /// Break after the last content element. Returns whether one was added.
    pub fn push_page_break(&mut self) -> bool {
        let end = self.content.len();
        self.insert_gaps([end]) == 1
    }

    /// Number of content (non-break) elements.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    pub fn break_count(&self) -> usize {
        self.breaks.len()
    }

    /// Content plus breaks.
    pub fn len(&self) -> usize {
        self.content.len() + self.breaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn content(&self) -> &[Element] {
        &self.content
    }

    /// Gap indices holding a break.
    pub fn breaks(&self) -> impl Iterator<Item = usize> + '_ {
        self.breaks.iter().copied()
    }

    /// Content and breaks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        (0..=self.content.len()).flat_map(move |i| {
            let brk = self.breaks.contains(&i).then_some(&PAGE_BREAK);
            brk.into_iter().chain(self.content.get(i))
        })
    }

    pub fn into_elements(self) -> Vec<Element> {
        let mut out = Vec::with_capacity(self.len());
        let end = self.content.len();
        for (i, e) in self.content.into_iter().enumerate() {
            if self.breaks.contains(&i) {
                out.push(Element::PageBreak);
            }
            out.push(e);
        }
        if self.breaks.contains(&end) {
            out.push(Element::PageBreak);
        }
        out
    }

    /// Insert page breaks at story indices `0..=len`, counting existing
    /// breaks as elements. Index `i` places a break before the element now
    /// at position `i`; `len` appends one.
    ///
    /// Out-of-range indices are dropped with a warning. Duplicates collapse,
    /// index 0 is skipped, and an index next to an existing break is left
    /// alone. All indices refer to the story as it was before the call.
    /// Returns the number of breaks actually inserted.
    pub fn insert_page_breaks(&mut self, indices: &[i64]) -> usize {
        if self.content.is_empty() {
            return 0;
        }
        let len = self.len() as i64;
        let mut valid = BTreeSet::new();
        for &idx in indices {
            if (0..=len).contains(&idx) {
                valid.insert(idx as usize);
            } else {
                log::warn!("page break index {} is out of range (0-{}), skipping", idx, len);
            }
        }
        if valid.remove(&0) {
            log::warn!("skipping page break at beginning of document");
        }

        let gaps: BTreeSet<usize> = valid.into_iter().map(|idx| self.gap_at(idx)).collect();
        self.insert_gaps(gaps)
    }

    /// Gap for story index `idx`: the index minus the breaks placed before it.
    fn gap_at(&self, idx: usize) -> usize {
        let before = self
            .breaks
            .iter()
            .enumerate()
            .take_while(|&(k, &gap)| gap + k < idx)
            .count();
        idx - before
    }

    /// Fill content gaps with breaks. Gap 0 and gaps already holding a
    /// break are skipped.
    fn insert_gaps(&mut self, gaps: impl IntoIterator<Item = usize>) -> usize {
        let mut inserted = 0;
        for gap in gaps {
            if gap == 0 || gap > self.content.len() {
                continue;
            }
            if self.breaks.insert(gap) {
                inserted += 1;
            }
        }
        inserted
    }

    /// [`Story::insert_page_breaks`] for untrusted JSON. Anything but a list
    /// leaves the story unchanged; non-integer entries are dropped.
    pub fn insert_page_breaks_value(&mut self, value: &Value) -> usize {
        match parse_indices(value) {
            Some(indices) => self.insert_page_breaks(&indices),
            None => 0,
        }
    }

    /// Run each policy condition in turn: custom positions, headings,
    /// tables, then element count. Returns the total breaks inserted.
    pub fn apply_break_policy(&mut self, policy: &BreakPolicy) -> usize {
        if self.content.is_empty() {
            return 0;
        }
        let mut inserted = 0;

        if !policy.custom_positions.is_empty() {
            inserted += self.insert_page_breaks(&policy.custom_positions);
        }

        if policy.after_headings {
            let gaps: Vec<usize> = self
                .content
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e, Element::Paragraph(p) if matches!(p.role, Role::Heading(_))))
                .map(|(i, _)| i + 1)
                .collect();
            inserted += self.insert_gaps(gaps);
        }

        if policy.before_tables {
            let gaps: Vec<usize> = self
                .content
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e, Element::Table(_)))
                .map(|(i, _)| i)
                .collect();
            inserted += self.insert_gaps(gaps);
        }

        if let Some(max) = policy.max_elements_per_page.filter(|&m| m > 0) {
            let mut gaps = Vec::new();
            let mut count = 0;
            for i in 0..self.content.len() {
                if self.breaks.contains(&i) {
                    count = 0;
                }
                count += 1;
                if count >= max {
                    gaps.push(i + 1);
                    count = 0;
                }
            }
            inserted += self.insert_gaps(gaps);
        }

        inserted
    }
}

/// Integer indices from a JSON list. Numeric strings count; other entries
/// are dropped with a warning. `None` when `value` is not a list.
pub(crate) fn parse_indices(value: &Value) -> Option<Vec<i64>> {
    let Some(items) = value.as_array() else {
        log::warn!("page breaks must be a list of indices, got {}", value);
        return None;
    };
    let indices = items
        .iter()
        .filter_map(|v| {
            let idx = v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()));
            if idx.is_none() {
                log::warn!("invalid page break index '{}', must be integer, skipping", v);
            }
            idx
        })
        .collect();
    Some(indices)
}

/// Serde adapter for index lists that tolerates bad entries the way
/// [`parse_indices`] does. A non-list reads as empty.
pub(crate) fn lenient_indices<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Value::deserialize(de)?;
    let indices = parse_indices(&value).unwrap_or_default();
    Ok(indices
        .into_iter()
        .filter_map(|i| {
            let idx = T::try_from(i).ok();
            if idx.is_none() {
                log::warn!("index {} is out of range, skipping", i);
            }
            idx
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Paragraph, Table};
    use crate::style::TextStyle;
    use crate::text::Font;
    use pretty_assertions::assert_eq;

    fn spacers(n: usize) -> Story {
        let mut s = Story::new();
        s.extend((0..n).map(|i| Element::Spacer(i as f32)));
        s
    }

    fn layout(story: &Story) -> Vec<String> {
        story
            .iter()
            .map(|e| match e {
                Element::Spacer(h) => format!("{}", h),
                Element::PageBreak => "|".to_string(),
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_insert_counts_and_preserves_order() {
        let mut s = spacers(4);
        assert_eq!(s.insert_page_breaks(&[3, 1, 4, 1]), 3);
        assert_eq!(s.len(), 7);
        assert_eq!(layout(&s), vec!["0", "|", "1", "2", "|", "3", "|"]);
    }

    #[test]
    fn test_indices_count_existing_breaks() {
        let mut s = spacers(3);
        s.insert_page_breaks(&[1]);
        assert_eq!(layout(&s), vec!["0", "|", "1", "2"]);

        assert_eq!(s.insert_page_breaks(&[3]), 1);
        assert_eq!(layout(&s), vec!["0", "|", "1", "|", "2"]);

        assert_eq!(s.insert_page_breaks(&[5]), 1);
        assert_eq!(layout(&s), vec!["0", "|", "1", "|", "2", "|"]);
    }

    #[test]
    fn test_indices_next_to_a_break_are_skipped() {
        let mut s = spacers(3);
        s.insert_page_breaks(&[1]);
        // before the break, and just after it
        assert_eq!(s.insert_page_breaks(&[1, 2]), 0);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_indices_refer_to_story_before_the_call() {
        let mut s = spacers(4);
        s.insert_page_breaks(&[2]);
        // [0, 1, |, 2, 3]: 4 sits before spacer 3, 1 before spacer 1
        assert_eq!(s.insert_page_breaks(&[4, 1]), 2);
        assert_eq!(layout(&s), vec!["0", "|", "1", "|", "2", "|", "3"]);
    }

    #[test]
    fn test_reapplying_never_doubles_breaks() {
        let mut s = spacers(5);
        assert_eq!(s.insert_page_breaks(&[2]), 1);
        assert_eq!(s.insert_page_breaks(&[2]), 0);

        for _ in 0..3 {
            s.insert_page_breaks(&[2, 3, 4]);
        }
        let flat = layout(&s);
        assert!(flat.windows(2).all(|w| !(w[0] == "|" && w[1] == "|")), "{:?}", flat);
        assert_ne!(flat[0], "|");
    }

    #[test]
    fn test_never_leading_break() {
        let mut s = spacers(3);
        assert_eq!(s.insert_page_breaks(&[0]), 0);
        assert_eq!(s.iter().next(), Some(&Element::Spacer(0.0)));
    }

    #[test]
    fn test_out_of_range_dropped() {
        let mut s = spacers(2);
        assert_eq!(s.insert_page_breaks(&[-1, 3, 99]), 0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_empty_story_is_untouched() {
        let mut s = Story::new();
        assert_eq!(s.insert_page_breaks(&[0, 1]), 0);
        assert!(!s.push_page_break());
        assert!(s.is_empty());
    }

    #[test]
    fn test_push_page_break_no_duplicates() {
        let mut s = spacers(1);
        s.push(Element::PageBreak);
        s.push(Element::PageBreak);
        assert_eq!(s.break_count(), 1);
        s.push(Element::Spacer(9.0));
        assert_eq!(layout(&s), vec!["0", "|", "9"]);
    }

    #[test]
    fn test_malformed_json_is_noop() {
        let mut s = spacers(3);
        assert_eq!(s.insert_page_breaks_value(&serde_json::json!({"a": 1})), 0);
        assert_eq!(s.insert_page_breaks_value(&serde_json::json!(["x", 1, "2", null])), 2);
        assert_eq!(layout(&s), vec!["0", "|", "1", "|", "2"]);
    }

    #[test]
    fn test_policy_drops_bad_positions() {
        let policy: BreakPolicy =
            serde_json::from_value(serde_json::json!({"custom_positions": [1, "x", "2", 1.5], "before_tables": true}))
                .unwrap();
        assert_eq!(policy.custom_positions, vec![1, 2]);
        assert!(policy.before_tables);

        let policy: BreakPolicy = serde_json::from_value(serde_json::json!({"custom_positions": "3"})).unwrap();
        assert!(policy.custom_positions.is_empty());
    }

    #[test]
    fn test_into_elements_matches_iter() {
        let mut s = spacers(3);
        s.insert_page_breaks(&[1, 3]);
        let flat: Vec<Element> = s.iter().cloned().collect();
        assert_eq!(s.into_elements(), flat);
    }

    #[test]
    fn test_policy_after_headings_and_before_tables() {
        let style = TextStyle::new(Font::Helvetica, 12.0);
        let mut s = Story::new();
        s.push(Paragraph::plain("H", &style).role(Role::Heading(1)).into());
        s.push(Paragraph::plain("body", &style).into());
        s.push(Table::from_text(&[vec!["a"]]).into());
        let policy = BreakPolicy {
            after_headings: true,
            before_tables: true,
            ..Default::default()
        };
        assert_eq!(s.apply_break_policy(&policy), 2);
        assert_eq!(layout(&s), vec!["paragraph", "|", "paragraph", "|", "table"]);
    }

    #[test]
    fn test_policy_max_elements_resets_at_breaks() {
        let mut s = spacers(5);
        s.insert_page_breaks(&[1]);
        let policy = BreakPolicy {
            max_elements_per_page: Some(2),
            ..Default::default()
        };
        assert_eq!(s.apply_break_policy(&policy), 2);
        assert_eq!(layout(&s), vec!["0", "|", "1", "2", "|", "3", "4", "|"]);
    }
}
