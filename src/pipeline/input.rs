//! Input resolution: normalise a user-supplied path, URL, or byte buffer to a
//! local PDF file.
//!
//! pdfium opens documents from a path, so URLs are downloaded into a
//! `TempDir` and in-memory bytes are spilled into a `NamedTempFile`. Either
//! one is kept inside [`ResolvedInput`] and deleted when it is dropped,
//! whatever the outcome of the extraction.
//!
//! Every route checks the `%PDF` file signature before pdfium sees the file.

use crate::error::PdfSearchError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info};

/// The four leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// The resolved input: a local path or a temp file owned for the duration
/// of processing.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
    /// Input was an in-memory buffer spilled to a temp file.
    Spilled(NamedTempFile),
}

impl ResolvedInput {
    /// Get the path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
            ResolvedInput::Spilled(file) => file.path(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Validate the PDF signature, returning the offending leading bytes on mismatch.
///
/// Inputs shorter than four bytes are zero-padded in the returned magic.
pub fn check_signature(head: &[u8]) -> Result<(), [u8; 4]> {
    if head.len() >= 4 && &head[..4] == PDF_SIGNATURE {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = head.len().min(4);
    magic[..n].copy_from_slice(&head[..n]);
    Err(magic)
}

/// Resolve the input string to a local PDF file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, PdfSearchError> {
    if input.trim().is_empty() {
        return Err(PdfSearchError::InvalidInput {
            input: input.to_string(),
            reason: "expected a file path or an HTTP/HTTPS URL".into(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Spill an in-memory PDF into a temp file after checking its signature.
pub fn resolve_bytes(bytes: &[u8]) -> Result<ResolvedInput, PdfSearchError> {
    let mut tmp = NamedTempFile::new()
        .map_err(|e| PdfSearchError::Internal(format!("tempfile: {e}")))?;

    check_signature(bytes).map_err(|magic| PdfSearchError::NotAPdf {
        path: tmp.path().to_path_buf(),
        magic,
    })?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| PdfSearchError::Internal(format!("tempfile write: {e}")))?;

    debug!("Spilled {} bytes to {}", bytes.len(), tmp.path().display());
    Ok(ResolvedInput::Spilled(tmp))
}

/// Resolve a local file path, validating existence and PDF magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, PdfSearchError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PdfSearchError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfSearchError::PermissionDenied { path });
        }
        Err(_) => return Err(PdfSearchError::FileNotFound { path }),
    };

    let mut head = Vec::with_capacity(4);
    Read::by_ref(&mut file)
        .take(4)
        .read_to_end(&mut head)
        .map_err(|e| PdfSearchError::Internal(format!("read {}: {e}", path.display())))?;

    if let Err(magic) = check_signature(&head) {
        return Err(PdfSearchError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, PdfSearchError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfSearchError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            PdfSearchError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfSearchError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(PdfSearchError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);
    let bytes = response.bytes().await.map_err(map_send_err)?;

    let temp_dir = TempDir::new().map_err(|e| PdfSearchError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    if let Err(magic) = check_signature(&bytes) {
        return Err(PdfSearchError::NotAPdf {
            path: PathBuf::from(url),
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PdfSearchError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Pick a filename from the last URL path segment, or fall back to a fixed name.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}
