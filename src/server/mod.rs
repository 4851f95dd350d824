//! HTTP surface: upload form, upload endpoint, liveness probe.
//!
//! ```text
//! GET  /            static upload form
//! POST /upload-pdf  multipart (pdf, heading) → .xlsx / .docx download
//! GET  /health      "ok"
//! ```
//!
//! Each upload request runs the whole pipeline in the handler. The staged
//! upload is removed before the response is built, and the artifact is
//! removed by [`response::send_artifact`] once it has been read.

pub mod response;
pub mod upload;

use crate::config::ExtractionConfig;
use crate::convert::{extract_section, resolve_generator};
use crate::error::PdfSectionError;
use crate::pipeline::llm::TextGenerator;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::Router;
use response::{send_artifact, HttpError};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use upload::{receive_upload, Upload};

/// Room for multipart boundaries and the heading field on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>PDF Section Extractor</title>
</head>
<body>
  <h1>Extract a section from a PDF</h1>
  <form action="/upload-pdf" method="post" enctype="multipart/form-data">
    <p><label>PDF file <input type="file" name="pdf" accept="application/pdf" required></label></p>
    <p><label>Heading <input type="text" name="heading" required></label></p>
    <p><button type="submit">Extract</button></p>
  </form>
</body>
</html>
"#;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ExtractionConfig>,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Resolve the generator once so a missing credential fails at start-up.
    pub fn new(config: ExtractionConfig) -> Result<Self, PdfSectionError> {
        let generator = resolve_generator(&config)?;
        Ok(Self {
            config: Arc::new(config),
            generator,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(index))
        .route("/upload-pdf", post(upload_pdf))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), PdfSectionError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PdfSectionError::Internal(format!("Failed to bind {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| PdfSectionError::Internal(e.to_string()))?;

    info!(
        "Listening on http://{} (uploads: {}, output: {}, generator: {})",
        local,
        state.config.upload_dir.display(),
        state.config.output_dir.display(),
        state.generator.name()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PdfSectionError::Internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

async fn index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn health() -> &'static str {
    "ok"
}

async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, HttpError> {
    let Upload { mut file, heading } = receive_upload(&mut multipart, &state.config).await?;

    let result = extract_section(file.path(), &heading, &state.generator, &state.config).await;
    // Removal failures are logged inside `remove`.
    let _ = file.remove();

    let outcome = result?;
    send_artifact(outcome.artifact).await
}
