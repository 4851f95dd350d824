//! Upload receiver: multipart `pdf` + `heading` → staged temp file.
//!
//! The file field is streamed chunk by chunk into `upload-*.pdf` under the
//! configured upload directory, so the whole PDF is never held in memory.
//! The staged file belongs to the returned [`UploadedFile`]; dropping it
//! without calling [`UploadedFile::remove`] still deletes the file.

use crate::config::ExtractionConfig;
use crate::error::PdfSectionError;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Multipart field carrying the PDF.
pub const PDF_FIELD: &str = "pdf";

/// Multipart field carrying the heading text.
pub const HEADING_FIELD: &str = "heading";

/// A PDF staged in the upload directory for the length of one request.
#[derive(Debug)]
pub struct UploadedFile {
    temp: Option<TempPath>,
    path: PathBuf,
    /// Filename the client sent, if any. Never used to build paths.
    pub original_name: Option<String>,
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file. Calling this again, or after the file
    /// vanished by other means, returns `Ok(())`.
    pub fn remove(&mut self) -> io::Result<()> {
        let Some(temp) = self.temp.take() else {
            return Ok(());
        };
        match temp.close() {
            Ok(()) => {
                debug!("Removed upload {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
                Err(e)
            }
        }
    }
}

/// A validated upload request.
#[derive(Debug)]
pub struct Upload {
    pub file: UploadedFile,
    /// Trimmed, never empty.
    pub heading: String,
}

/// Read the multipart body, staging the `pdf` field on disk.
///
/// Fields may arrive in any order. Unknown fields, and repeats of a field
/// already seen, are skipped.
///
/// # Errors
/// - `MissingField` when `pdf` is absent or `heading` is absent or blank
/// - `UploadTooLarge` once the file passes `max_upload_bytes`
/// - `MalformedUpload` when the body is not valid multipart
/// - `UploadWriteFailed` when the upload directory is not writable
pub async fn receive_upload(
    multipart: &mut Multipart,
    config: &ExtractionConfig,
) -> Result<Upload, PdfSectionError> {
    let mut file: Option<UploadedFile> = None;
    let mut heading: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            PDF_FIELD if file.is_none() => {
                file = Some(stage_file(field, config).await?);
            }
            HEADING_FIELD if heading.is_none() => {
                heading = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!("Skipping multipart field {:?}", other),
        }
    }

    let file = file.ok_or(PdfSectionError::MissingField { field: PDF_FIELD })?;
    let heading = heading
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .ok_or(PdfSectionError::MissingField {
            field: HEADING_FIELD,
        })?;

    info!(
        "Received {} ({} bytes) with heading {:?}",
        file.original_name.as_deref().unwrap_or("<unnamed>"),
        file.size_bytes,
        heading
    );
    Ok(Upload { file, heading })
}

async fn stage_file(
    mut field: Field<'_>,
    config: &ExtractionConfig,
) -> Result<UploadedFile, PdfSectionError> {
    let dir = &config.upload_dir;
    let write_failed = |source: io::Error| PdfSectionError::UploadWriteFailed {
        dir: dir.clone(),
        source,
    };

    let staged = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(write_failed)?;
    let (std_file, temp) = staged.into_parts();

    let mut upload = UploadedFile {
        path: temp.to_path_buf(),
        temp: Some(temp),
        original_name: field.file_name().map(str::to_string),
        size_bytes: 0,
    };
    let mut out = tokio::fs::File::from_std(std_file);

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        upload.size_bytes += chunk.len() as u64;
        if upload.size_bytes > config.max_upload_bytes {
            warn!(
                "Upload passed {} bytes, aborting",
                config.max_upload_bytes
            );
            return Err(PdfSectionError::UploadTooLarge {
                limit: config.max_upload_bytes,
            });
        }
        out.write_all(&chunk).await.map_err(write_failed)?;
    }
    out.flush().await.map_err(write_failed)?;

    debug!("Staged {} bytes at {}", upload.size_bytes, upload.path.display());
    Ok(upload)
}

fn multipart_error(e: MultipartError) -> PdfSectionError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return PdfSectionError::MalformedUpload {
            reason: "request body too large".to_string(),
        };
    }
    PdfSectionError::MalformedUpload {
        reason: e.body_text(),
    }
}
