//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events while pages are read. Page events fire from the blocking pdfium
//! worker thread, so implementations must be `Send + Sync`.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfsearch::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct LineCounter {
//!     lines: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for LineCounter {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, line_count: usize) {
//!         self.lines.fetch_add(line_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(LineCounter { lines: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// All methods default to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once the page selection is known, before any page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before the fragments of a page (1-indexed) are read.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page's lines have been reconstructed.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, line_count: usize) {
        let _ = (page_num, total_pages, line_count);
    }

    /// Called when reading a page fails. Extraction aborts right after.
    ///
    /// `error` is owned so implementations can move it into spawned tasks.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once segmentation has produced the final paragraphs.
    fn on_extraction_complete(&self, total_pages: usize, paragraph_count: usize) {
        let _ = (total_pages, paragraph_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
