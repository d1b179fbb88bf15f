//! Paragraph segmentation over the document-wide line stream.
//!
//! PDFs carry no paragraph markers, so paragraphs are recovered from
//! line-local cues only. Each trimmed line is classified by the first matching
//! rule, in this order:
//!
//! | # | Rule | Effect |
//! |---|------|--------|
//! | 1 | blank line | flush the pending paragraph |
//! | 2 | list marker | flush, then start a new pending paragraph with this line |
//! | 3 | all-caps heading | flush, emit the line on its own |
//! | 4 | anything else | append to the pending paragraph with a single space |
//!
//! The order is load-bearing: `"1. INTRODUCTION"` is a list marker, not a
//! heading, and can absorb the lines that follow it.
//!
//! ## Rule details
//!
//! * **List marker** matches `^[0-9]+\.` (ASCII digits only) or a standalone
//!   letter followed by a period anywhere in the line (`a.`, `J. Smith`,
//!   `e.g.`). The second clause also fires on ordinary abbreviations; that is
//!   the current behaviour.
//! * **Trimming** strips Unicode whitespace and U+FEFF, so a line holding only
//!   a byte-order mark is blank.
//! * **Heading** compares the line against its Unicode default uppercase
//!   mapping ([`str::to_uppercase`], locale-independent) and requires more
//!   than three characters, counted as Unicode scalar values. Lines without
//!   cased letters (`"2024"`, `"----"`) therefore also count as headings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static RE_LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.|\b\p{Alphabetic}\.").unwrap());

/// Minimum heading length is `HEADING_MIN_CHARS + 1`.
const HEADING_MIN_CHARS: usize = 3;

/// Separator used by [`format_paragraphs`].
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Classification of one trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Blank,
    ListMarker,
    Heading,
    Continuation,
}

/// Strip surrounding whitespace and byte-order marks.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Classify an already-trimmed line.
pub fn classify_line(line: &str) -> LineKind {
    if line.is_empty() {
        LineKind::Blank
    } else if RE_LIST_MARKER.is_match(line) {
        LineKind::ListMarker
    } else if is_heading(line) {
        LineKind::Heading
    } else {
        LineKind::Continuation
    }
}

fn is_heading(line: &str) -> bool {
    line.chars().count() > HEADING_MIN_CHARS && line.to_uppercase() == line
}

/// Scan state: the pending paragraph and everything flushed so far.
#[derive(Debug, Default)]
struct Segmenter {
    current: String,
    paragraphs: Vec<String>,
}

impl Segmenter {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.current));
        }
    }

    fn push_line(mut self, line: &str) -> Self {
        match classify_line(line) {
            LineKind::Blank => self.flush(),
            LineKind::ListMarker => {
                self.flush();
                self.current.push_str(line);
            }
            LineKind::Heading => {
                self.flush();
                self.paragraphs.push(line.to_string());
            }
            LineKind::Continuation => {
                if !self.current.is_empty() {
                    self.current.push(' ');
                }
                self.current.push_str(line);
            }
        }
        self
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.paragraphs
    }
}

/// Split a document line stream into paragraphs.
///
/// Lines are separated by `\n` or `\r\n` and trimmed (whitespace and U+FEFF)
/// before classification.
/// Blank lines never reach the output. Deterministic and infallible.
pub fn segment_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(trim_line)
        .fold(Segmenter::default(), Segmenter::push_line)
        .finish()
}

/// Join paragraphs with a blank line, the `formatted_text` form.
pub fn format_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join(PARAGRAPH_SEPARATOR)
}
