//! Eager (full-document) extraction entry points.
//!
//! Every entry point follows the same path: resolve the input, read the
//! metadata, then fragments for the selected pages, then reconstruct each
//! page's lines, join the pages into one line stream, and segment that
//! stream once for the whole document.
//!
//! Each call owns its own state end to end, so documents can be extracted
//! concurrently with [`extract_batch`] or from independent tasks.

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::PdfSearchError;
use crate::output::{DocumentMetadata, ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::fragments::{self, PageFragments};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::lines::{count_lines, reconstruct_lines_with};
use crate::pipeline::paragraphs::{format_paragraphs, segment_paragraphs};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract paragraphs from a PDF file or URL.
///
/// # Errors
/// Any failure aborts the whole extraction:
/// - file not found / permission denied / download failure
/// - not a PDF (signature mismatch)
/// - an explicit page selection matches no page
/// - pdfium cannot read one of the selected pages
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfSearchError> {
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    extract_resolved(&resolved, config).await
}

/// Extract paragraphs from PDF bytes held in memory.
///
/// The bytes are spilled to a temp file that is removed when this returns.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfSearchError> {
    info!("Starting extraction from {} in-memory bytes", bytes.len());
    let resolved = input::resolve_bytes(bytes)?;
    extract_resolved(&resolved, config).await
}

/// Extract a PDF and write `formatted_text` to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfSearchError> {
    let output = extract(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.formatted_text).await?;
    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfSearchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfSearchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract several documents concurrently, `config.concurrency` at a time.
///
/// Results come back in input order; one document failing does not affect
/// the others.
pub async fn extract_batch<S: AsRef<str>>(
    inputs: &[S],
    config: &ExtractionConfig,
) -> Vec<Result<ExtractionOutput, PdfSearchError>> {
    let mut results: Vec<(usize, Result<ExtractionOutput, PdfSearchError>)> =
        stream::iter(inputs.iter().enumerate().map(|(i, input)| async move {
            (i, extract(input.as_ref(), config).await)
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, r)| r).collect()
}

/// Extract PDF metadata without reading any page text.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentMetadata, PdfSearchError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    fragments::extract_metadata(resolved.path(), config.password.as_deref()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn extract_resolved(
    resolved: &ResolvedInput,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfSearchError> {
    let total_start = Instant::now();
    let pdf_path = resolved.path();

    let metadata = fragments::extract_metadata(pdf_path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    let page_indices = select_pages(&config.pages, total_pages)?;
    debug!("Selected {} pages for extraction", page_indices.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(page_indices.len());
    }

    let read_start = Instant::now();
    let page_fragments = fragments::read_fragments(
        pdf_path,
        config.password.as_deref(),
        &page_indices,
        config.progress_callback.clone(),
    )
    .await?;
    let extraction_duration_ms = read_start.elapsed().as_millis() as u64;

    let pages = reconstruct_pages(&page_fragments, config);
    let raw_text = join_pages(&pages, config);
    let paragraphs = segment_paragraphs(&raw_text);
    let formatted_text = format_paragraphs(&paragraphs);

    let stats = ExtractionStats {
        total_pages,
        extracted_pages: pages.len(),
        fragment_count: pages.iter().map(|p| p.fragment_count).sum(),
        line_count: pages.iter().map(|p| p.line_count).sum(),
        paragraph_count: paragraphs.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        extraction_duration_ms,
    };

    info!(
        "Extraction complete: {} pages, {} lines, {} paragraphs, {}ms",
        stats.extracted_pages, stats.line_count, stats.paragraph_count, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(page_indices.len(), paragraphs.len());
    }

    Ok(ExtractionOutput {
        raw_text,
        paragraphs,
        formatted_text,
        pages,
        metadata,
        stats,
    })
}

/// Expand the page selection. An explicit selection that matches nothing is an
/// error; `All` on a zero-page document is simply empty.
pub(crate) fn select_pages(
    selection: &PageSelection,
    total_pages: usize,
) -> Result<Vec<usize>, PdfSearchError> {
    let indices = selection.to_indices(total_pages);
    if indices.is_empty() && *selection != PageSelection::All {
        return Err(PdfSearchError::PageOutOfRange {
            page: selection.first_requested(),
            total: total_pages,
        });
    }
    Ok(indices)
}

/// Run line reconstruction on every page, in page order.
pub(crate) fn reconstruct_pages(
    page_fragments: &[PageFragments],
    config: &ExtractionConfig,
) -> Vec<PageText> {
    let total = page_fragments.len();
    let mut pages: Vec<PageText> = page_fragments
        .iter()
        .map(|pf| {
            let text = reconstruct_lines_with(&pf.fragments, config.baseline_match);
            let page = PageText {
                page_num: pf.index + 1,
                line_count: count_lines(&text),
                fragment_count: pf.fragments.len(),
                text,
            };
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(page.page_num, total, page.line_count);
            }
            page
        })
        .collect();
    pages.sort_by_key(|p| p.page_num);
    pages
}

/// Join page texts into the document line stream.
pub(crate) fn join_pages(pages: &[PageText], config: &ExtractionConfig) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(config.page_join.separator())
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), PdfSearchError> {
    let write_err = |e: std::io::Error| PdfSearchError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
