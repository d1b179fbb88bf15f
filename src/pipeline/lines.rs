//! Line reconstruction: turn a page's positioned text fragments into lines.
//!
//! The fragment source hands us text runs in the order the content stream
//! emits them. Consecutive fragments that sit on the same baseline belong to
//! the same visual row and are concatenated without a separator; a change of
//! baseline starts a new line.
//!
//! ## Known limitation
//!
//! Grouping is only as good as the upstream parser. Same-row fragments must
//! carry bit-identical baselines and arrive left-to-right. No horizontal
//! sorting or Y-clustering happens here, so multi-column or rotated text comes
//! out in emission order. [`BaselineMatch::Tolerance`] is the one opt-in knob
//! for parsers that jitter baselines by a fraction of a point.

use serde::{Deserialize, Deserializer, Serialize};

/// One positioned run of text as emitted by the PDF content parser.
///
/// Deserialisation is lenient: a missing, `null`, or non-string `text` field
/// yields an empty fragment instead of failing the whole page, and a missing
/// baseline defaults to `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,

    /// Vertical position of the run, in PDF points.
    #[serde(default, alias = "baselineY")]
    pub baseline_y: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, baseline_y: f32) -> Self {
        Self {
            text: text.into(),
            baseline_y,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// How two baselines are compared when deciding whether fragments share a line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BaselineMatch {
    /// Baselines must be exactly equal. (default)
    #[default]
    Exact,
    /// Baselines within this many points count as the same line.
    Tolerance(f32),
}

impl BaselineMatch {
    /// Whether a fragment at `next` continues the line whose last fragment sat at `current`.
    pub fn same_line(&self, current: f32, next: f32) -> bool {
        match *self {
            BaselineMatch::Exact => current == next,
            BaselineMatch::Tolerance(points) => (current - next).abs() <= points.abs(),
        }
    }
}

/// Reconstruct a page's lines using exact baseline equality.
///
/// Returns the lines joined by `\n`, in fragment-emission order. An empty
/// fragment list yields an empty string.
pub fn reconstruct_lines(fragments: &[TextFragment]) -> String {
    reconstruct_lines_with(fragments, BaselineMatch::Exact)
}

/// Reconstruct a page's lines with an explicit baseline comparison.
///
/// The reference baseline is always the previous fragment's, so a tolerance
/// applies between neighbours rather than to the first fragment of the line.
pub fn reconstruct_lines_with(fragments: &[TextFragment], matching: BaselineMatch) -> String {
    let capacity = fragments.iter().map(|f| f.text.len() + 1).sum();
    let mut text = String::with_capacity(capacity);
    let mut last_baseline: Option<f32> = None;

    for fragment in fragments {
        if let Some(current) = last_baseline {
            if !matching.same_line(current, fragment.baseline_y) {
                text.push('\n');
            }
        }
        text.push_str(&fragment.text);
        last_baseline = Some(fragment.baseline_y);
    }

    text
}

/// Number of lines in a reconstructed page.
pub fn count_lines(page_text: &str) -> usize {
    if page_text.is_empty() {
        0
    } else {
        page_text.split('\n').count()
    }
}
