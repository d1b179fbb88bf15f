//! Error types for the edgequake-pdfsearch library.
//!
//! There is a single fatal error type, [`PdfSearchError`]. Extraction is
//! all-or-nothing: if the fragment source fails on any selected page the
//! whole request aborts and no partial document is returned. The same holds
//! for questions once every retry has been spent.
//!
//! Line reconstruction and paragraph segmentation never fail; they appear
//! nowhere in this module.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdfsearch library.
#[derive(Debug, Error)]
pub enum PdfSearchError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not usable (bad path/URL, empty question, ...).
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file signature is not `%PDF`.
    #[error("Invalid file format: '{path}' is not a PDF\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection matched no page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium could not produce the text fragments of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, or point PDFIUM_LIB_PATH at the library\n\
file (or the directory containing it) and try again.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Query errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A question was asked over an empty paragraph list.
    #[error("No paragraphs to search: the document produced no text")]
    NoParagraphs,

    /// The LLM API kept failing after all retries.
    #[error("LLM API error after {retries} retries: {message}")]
    LlmApiError { retries: u32, message: String },

    /// Every attempt timed out.
    #[error("LLM call timed out after {secs}s ({retries} retries)")]
    ApiTimeout { secs: u64, retries: u32 },

    /// The provider answered, but with no usable content.
    #[error("Unexpected response from LLM provider: {detail}")]
    UnexpectedResponse { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
