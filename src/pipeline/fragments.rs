//! Fragment source: read positioned text runs out of a PDF via pdfium.
//!
//! Each pdfium text segment becomes one [`TextFragment`] whose baseline is the
//! origin y of the segment's first character, in PDF points. That is the
//! text-run baseline, so runs with and without descenders on one row still
//! compare equal. The segment's bottom edge is used only when pdfium reports
//! no character origin. Segments are taken in pdfium's own
//! order; nothing is sorted here, line grouping downstream depends on that
//! order being the emission order.
//!
//! pdfium is a blocking C library, so every public entry point hops onto
//! `tokio::task::spawn_blocking`.

use crate::error::PdfSearchError;
use crate::output::DocumentMetadata;
use crate::pipeline::lines::TextFragment;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fragments of a single page.
#[derive(Debug, Clone)]
pub struct PageFragments {
    /// 0-indexed page number.
    pub index: usize,
    pub fragments: Vec<TextFragment>,
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` (file or directory) first, then the
/// system library.
pub fn bind_pdfium() -> Result<Pdfium, PdfSearchError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            let path = PathBuf::from(path);
            let lib_path = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib_path.display());
            Pdfium::bind_to_library(&lib_path)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PdfSearchError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfSearchError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PdfSearchError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                PdfSearchError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            PdfSearchError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Read the text fragments of the selected pages.
///
/// Fails on the first page pdfium cannot read; no partial result is returned.
pub async fn read_fragments(
    pdf_path: &Path,
    password: Option<&str>,
    page_indices: &[usize],
    progress: Option<ProgressCallback>,
) -> Result<Vec<PageFragments>, PdfSearchError> {
    let path = pdf_path.to_path_buf();
    let password = password.map(str::to_string);
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || {
        read_fragments_blocking(&path, password.as_deref(), &indices, progress.as_ref())
    })
    .await
    .map_err(|e| PdfSearchError::Internal(format!("Fragment task panicked: {}", e)))?
}

fn read_fragments_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    page_indices: &[usize],
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PageFragments>, PdfSearchError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let selected = page_indices.len();
    info!("PDF loaded: {} pages, reading {}", total_pages, selected);

    let mut results = Vec::with_capacity(selected);

    for &idx in page_indices {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, selected);
        }

        let read = if idx >= total_pages {
            Err(format!("page index out of range (total={})", total_pages))
        } else {
            u16::try_from(idx)
                .map_err(|_| format!("page index {} exceeds pdfium's u16 range", idx))
                .and_then(|i| pages.get(i).map_err(|e| format!("{:?}", e)))
                .and_then(|page| page_fragments(&page).map_err(|e| format!("{:?}", e)))
        };

        match read {
            Ok(fragments) => {
                debug!("Page {}: {} fragments", page_num, fragments.len());
                results.push(PageFragments {
                    index: idx,
                    fragments,
                });
            }
            Err(detail) => {
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, selected, detail.clone());
                }
                return Err(PdfSearchError::TextExtractionFailed {
                    page: page_num,
                    detail,
                });
            }
        }
    }

    Ok(results)
}

fn page_fragments(page: &PdfPage) -> Result<Vec<TextFragment>, PdfiumError> {
    let text = page.text()?;
    let fragments = text
        .segments()
        .iter()
        .map(|segment| {
            let origin_y = segment
                .chars()
                .ok()
                .and_then(|chars| chars.iter().find_map(|c| c.origin_y().ok()))
                .map(|y| y.value);
            let baseline = segment_baseline(origin_y, segment.bounds().bottom().value);
            TextFragment::new(segment.text(), baseline)
        })
        .collect();
    Ok(fragments)
}

/// Baseline of a segment: its first character origin, else its bottom edge.
fn segment_baseline(first_origin_y: Option<f32>, bottom: f32) -> f32 {
    first_origin_y.unwrap_or(bottom)
}

/// Extract document metadata from a PDF without reading page text.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, PdfSearchError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| PdfSearchError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, PdfSearchError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata
            .get(tag)
            .map(|t| t.value().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_wins_over_box_bottom() {
        // "gy" hangs below the baseline, "ab" does not; both sit on y = 700.
        let with_descender = segment_baseline(Some(700.0), 697.2);
        let without = segment_baseline(Some(700.0), 700.0);
        assert_eq!(with_descender, without);
    }

    #[test]
    fn box_bottom_used_without_origin() {
        assert_eq!(segment_baseline(None, 512.5), 512.5);
    }
}
