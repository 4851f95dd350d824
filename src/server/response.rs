//! Response sender and HTTP error mapping.

use crate::error::PdfSectionError;
use crate::output::{ArtifactKind, OutputArtifact};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, warn};

/// Generic body for pipeline failures; details only go to the log.
pub const PROCESSING_FAILED: &str = "Failed to process PDF.";

/// A failed request: the status and short body the client sees, plus the
/// underlying error for the log.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    source: PdfSectionError,
}

impl HttpError {
    /// The artifact was produced but could not be read back.
    pub fn delivery(kind: ArtifactKind, source: PdfSectionError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Failed to download {} file.", kind.label()),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PdfSectionError> for HttpError {
    fn from(source: PdfSectionError) -> Self {
        let (status, message) = if source.is_client_error() {
            (StatusCode::BAD_REQUEST, source.to_string())
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                PROCESSING_FAILED.to_string(),
            )
        };
        Self {
            status,
            message,
            source,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            warn!("Rejected request: {}", self.source);
        } else {
            error!("Request failed ({:?}): {}", self.source.kind(), self.source);
        }
        (self.status, self.message).into_response()
    }
}

/// Read `artifact` into the response body and delete it.
///
/// The file is deleted whether or not the read succeeded.
pub async fn send_artifact(mut artifact: OutputArtifact) -> Result<Response, HttpError> {
    let read = tokio::fs::read(artifact.path()).await;
    // Failure to delete is logged by `remove` and does not fail the request.
    let _ = artifact.remove().await;

    let body = read.map_err(|source| {
        HttpError::delivery(
            artifact.kind,
            PdfSectionError::DeliveryFailed {
                path: artifact.path.clone(),
                source,
            },
        )
    })?;

    debug!("Sending {} ({} bytes)", artifact.file_name, body.len());
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.kind.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
