//! # edgequake-pdfsearch
//!
//! Turn PDF documents into clean, paragraph-structured text and ask questions
//! about them with an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file, URL, or bytes; check the %PDF signature
//!  ├─ 2. Fragments   positioned text runs per page via pdfium (spawn_blocking)
//!  ├─ 3. Lines       fragments sharing a baseline → one line, per page
//!  ├─ 4. Paragraphs  document-wide line classification → paragraph list
//!  └─ 5. Query       optional: answer a question over the paragraphs (LLM)
//! ```
//!
//! Stages 3 and 4 are pure and also usable on their own, see
//! [`reconstruct_lines`] and [`segment_paragraphs`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfsearch::{ask, extract, ExtractionConfig, QueryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = extract("document.pdf", &ExtractionConfig::default()).await?;
//!     println!("{}", output.formatted_text);
//!
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let answer = ask("What is this document about?", &output.paragraphs, &QueryConfig::default()).await?;
//!     println!("{}", answer.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsearch` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## pdfium
//!
//! Text is read with `pdfium-render`. The library binds to the file or
//! directory named by `PDFIUM_LIB_PATH`, falling back to the system library.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod search;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, PageJoin, PageSelection, QueryConfig,
    QueryConfigBuilder, DEFAULT_MODEL,
};
pub use error::PdfSearchError;
pub use extract::{
    extract, extract_batch, extract_from_bytes, extract_sync, extract_to_file, inspect,
};
pub use output::{Answer, DocumentMetadata, ExtractionOutput, ExtractionStats, PageText};
pub use pipeline::lines::{reconstruct_lines, reconstruct_lines_with, BaselineMatch, TextFragment};
pub use pipeline::paragraphs::{classify_line, format_paragraphs, segment_paragraphs, LineKind};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use search::{ask, ask_document};
