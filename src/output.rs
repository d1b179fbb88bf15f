//! Result types returned by extraction and question answering.
//!
//! Everything here is `Serialize`, so the CLI's `--json` output is just
//! `serde_json::to_string_pretty` of these structs.

use serde::{Deserialize, Serialize};

/// The result of extracting one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Document line stream: every page's reconstructed lines, pages joined
    /// per [`crate::config::PageJoin`].
    pub raw_text: String,

    /// Paragraphs in document order.
    pub paragraphs: Vec<String>,

    /// Paragraphs joined by a blank line.
    pub formatted_text: String,

    /// Per-page reconstructed text, in page order.
    pub pages: Vec<PageText>,

    pub metadata: DocumentMetadata,

    pub stats: ExtractionStats,
}

/// Reconstructed text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    pub text: String,
    pub fragment_count: usize,
    pub line_count: usize,
}

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters and timings for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages actually read (after page selection).
    pub extracted_pages: usize,
    pub fragment_count: usize,
    pub line_count: usize,
    pub paragraph_count: usize,
    pub total_duration_ms: u64,
    /// Time spent inside pdfium reading fragments.
    pub extraction_duration_ms: u64,
}

/// An answer from the LLM query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    /// Number of paragraphs sent as context.
    pub paragraph_count: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u32,
}
