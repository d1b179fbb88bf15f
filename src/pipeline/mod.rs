//! Pipeline stages for PDF-to-paragraph extraction and querying.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ fragments ──▶ lines ──▶ paragraphs ──▶ query
//! (path/URL)  (pdfium)    (per page)  (whole doc)    (LLM)
//! ```
//!
//! 1. [`input`]: canonicalise a path, URL, or byte buffer to a local
//!    file and check the `%PDF` signature
//! 2. [`fragments`]: read positioned text runs per page; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`lines`]: group fragments sharing a baseline into lines (pure)
//! 4. [`paragraphs`]: classify lines and group them into paragraphs (pure)
//! 5. [`query`]: answer questions over the paragraphs with retry/backoff;
//!    the only stage besides URL download with network I/O

pub mod fragments;
pub mod input;
pub mod lines;
pub mod paragraphs;
pub mod query;
