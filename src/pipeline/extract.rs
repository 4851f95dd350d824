//! Text extraction: PDF bytes → plain text via `pdf-extract`.
//!
//! `pdf-extract` is synchronous and can take hundreds of milliseconds on
//! large documents, so it runs on the blocking pool. A panic inside the
//! parser surfaces as a `JoinError` and is reported as
//! [`PdfSectionError::CorruptPdf`] like any other parse failure.

use crate::error::PdfSectionError;
use std::path::Path;
use tracing::{debug, info};

/// Read the PDF at `path` and return all of its extractable text.
pub async fn extract_text(path: &Path) -> Result<String, PdfSectionError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PdfSectionError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => PdfSectionError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfSectionError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    extract_text_from_bytes(path, bytes).await
}

/// Extract text from bytes already in memory. `path` is only used in errors.
pub async fn extract_text_from_bytes(
    path: &Path,
    bytes: Vec<u8>,
) -> Result<String, PdfSectionError> {
    check_magic(path, &bytes)?;
    debug!("Parsing {} bytes of PDF", bytes.len());

    let owned_path = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| PdfSectionError::CorruptPdf {
            path: owned_path.clone(),
            detail: format!("extractor panicked: {e}"),
        })?
        .map_err(|e| PdfSectionError::CorruptPdf {
            path: owned_path,
            detail: e.to_string(),
        })?;

    info!("Extracted {} chars of text", text.len());
    Ok(text)
}

/// Reject anything that doesn't start with the `%PDF` header.
fn check_magic(path: &Path, bytes: &[u8]) -> Result<(), PdfSectionError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(PdfSectionError::NotAPdf {
        path: path.to_path_buf(),
        magic,
    })
}
