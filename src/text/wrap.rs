//! Greedy line breaking over styled spans.
//!
//! Words may straddle span boundaries (`**bold**,` is one word made of two
//! spans), so tokenizing keeps a word as a list of pieces. Runs of spaces
//! collapse to one. A word wider than the whole line is broken between
//! characters.

use super::Span;

/// One laid-out line of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<Span>,
    /// Natural width in points.
    pub width: f32,
    /// Inter-word spaces on the line, used for justification.
    pub spaces: usize,
    /// Last line of a paragraph (or before a hard break); never justified.
    pub ends_paragraph: bool,
}

impl Line {
    fn push(&mut self, span: Span) {
        self.width += span.width();
        if let Some(last) = self.runs.last_mut() {
            if last.same_style(&span) {
                last.text.push_str(&span.text);
                return;
            }
        }
        self.runs.push(span);
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Largest font size on the line, or `None` if empty.
    pub fn max_size(&self) -> Option<f32> {
        self.runs.iter().map(|r| r.size).reduce(f32::max)
    }

    /// Plain text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

enum Token {
    Word(Vec<Span>),
    Space(Span),
    Break,
}

fn tokenize(spans: &[Span]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<Span> = Vec::new();

    for span in spans {
        let mut piece = String::new();
        for ch in span.text.chars() {
            match ch {
                '\n' | ' ' | '\t' => {
                    if !piece.is_empty() {
                        word.push(span.with_text(std::mem::take(&mut piece)));
                    }
                    if !word.is_empty() {
                        tokens.push(Token::Word(std::mem::take(&mut word)));
                    }
                    tokens.push(if ch == '\n' {
                        Token::Break
                    } else {
                        Token::Space(span.with_text(" "))
                    });
                }
                _ => piece.push(ch),
            }
        }
        if !piece.is_empty() {
            word.push(span.with_text(piece));
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// Break `spans` into lines no wider than `max_width` (except where a single
/// character is wider). Returns no lines for text without any words or breaks.
pub fn wrap_spans(spans: &[Span], max_width: f32) -> Vec<Line> {
    let tokens = tokenize(spans);
    if tokens.iter().all(|t| matches!(t, Token::Space(_))) {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut cur = Line::default();
    let mut pending_space: Option<Span> = None;

    for token in tokens {
        match token {
            Token::Break => {
                cur.ends_paragraph = true;
                lines.push(std::mem::take(&mut cur));
                pending_space = None;
            }
            Token::Space(s) => {
                if !cur.is_empty() && pending_space.is_none() {
                    pending_space = Some(s);
                }
            }
            Token::Word(pieces) => {
                let word_w: f32 = pieces.iter().map(Span::width).sum();
                let space_w = pending_space.as_ref().map(Span::width).unwrap_or(0.0);

                if !cur.is_empty() && cur.width + space_w + word_w > max_width {
                    lines.push(std::mem::take(&mut cur));
                    pending_space = None;
                }

                if cur.is_empty() && word_w > max_width && max_width > 0.0 {
                    split_long_word(pieces, max_width, &mut lines, &mut cur);
                    continue;
                }

                if let Some(s) = pending_space.take() {
                    cur.push(s);
                    cur.spaces += 1;
                }
                for p in pieces {
                    cur.push(p);
                }
            }
        }
    }

    if !cur.is_empty() || lines.is_empty() {
        cur.ends_paragraph = true;
        lines.push(cur);
    } else if let Some(last) = lines.last_mut() {
        last.ends_paragraph = true;
    }
    lines
}

fn split_long_word(pieces: Vec<Span>, max_width: f32, lines: &mut Vec<Line>, cur: &mut Line) {
    for piece in pieces {
        let mut buf = String::new();
        for ch in piece.text.chars() {
            let ch_w = piece.font.text_width(ch.encode_utf8(&mut [0; 4]), piece.size);
            let buf_w = piece.font.text_width(&buf, piece.size);
            if cur.width + buf_w + ch_w > max_width && (!cur.is_empty() || !buf.is_empty()) {
                if !buf.is_empty() {
                    cur.push(piece.with_text(std::mem::take(&mut buf)));
                }
                lines.push(std::mem::take(cur));
            }
            buf.push(ch);
        }
        if !buf.is_empty() {
            cur.push(piece.with_text(buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::text::Font;

    fn span(text: &str) -> Span {
        Span::new(text, Font::Courier, 10.0, Color::BLACK)
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        let lines = wrap_spans(&[span("hello world")], 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "hello world");
        assert_eq!(lines[0].spaces, 1);
        assert!(lines[0].ends_paragraph);
    }

    #[test]
    fn test_wrap_breaks_at_width() {
        // Courier 10pt: 6pt per char. "aaaa bbbb" = 54pt.
        let lines = wrap_spans(&[span("aaaa bbbb cccc")], 54.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "aaaa bbbb");
        assert_eq!(lines[1].text(), "cccc");
        assert!(!lines[0].ends_paragraph);
        assert!(lines[1].ends_paragraph);
    }

    #[test]
    fn test_wrap_collapses_spaces() {
        let lines = wrap_spans(&[span("a    b")], 500.0);
        assert_eq!(lines[0].text(), "a b");
    }

    #[test]
    fn test_wrap_hard_breaks() {
        let lines = wrap_spans(&[span("one\n\nthree")], 500.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
        assert!(lines[0].ends_paragraph);
    }

    #[test]
    fn test_word_spanning_styles_stays_together() {
        let bold = Span::new("bold", Font::CourierBold, 10.0, Color::BLACK);
        let lines = wrap_spans(&[span("xxxxxx "), bold, span(", tail")], 40.0);
        assert_eq!(lines[0].text(), "xxxxxx");
        assert_eq!(lines[1].text(), "bold,");
        assert_eq!(lines[1].runs.len(), 2);
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = wrap_spans(&[span("abcdefghij")], 30.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "abcde");
        assert_eq!(lines[1].text(), "fghij");
    }

    #[test]
    fn test_blank_text_yields_no_lines() {
        assert!(wrap_spans(&[span("   ")], 100.0).is_empty());
        assert!(wrap_spans(&[], 100.0).is_empty());
    }
}
