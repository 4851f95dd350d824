//! Error types for the edgequake-pdfsection library.
//!
//! A single fatal error type, [`PdfSectionError`], covers every stage of the
//! pipeline. Each variant belongs to one [`ErrorKind`] so the HTTP layer and
//! the CLI can decide how loudly to report it without matching on every
//! variant:
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | `Parse` | the text extractor (bad magic bytes, unparsable PDF) |
//! | `RemoteService` | the content locator (provider setup, API failures) |
//! | `Io` | staging uploads, renderers writing artifacts, input resolution |
//! | `Download` | the response sender reading an artifact back |
//! | `Validation` | the upload receiver (missing fields, oversize upload) |

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PdfSectionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    RemoteService,
    Io,
    Download,
    Validation,
    Config,
    Internal,
}

/// All fatal errors returned by the edgequake-pdfsection library.
#[derive(Debug, Error)]
pub enum PdfSectionError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// A required multipart field was absent or blank.
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The uploaded file exceeded the configured size cap.
    #[error("Upload exceeds the maximum size of {limit} bytes")]
    UploadTooLarge { limit: u64 },

    /// The multipart body could not be read.
    #[error("Malformed upload: {reason}")]
    MalformedUpload { reason: String },

    /// The upload could not be staged on disk.
    #[error("Failed to stage upload in '{dir}': {source}")]
    UploadWriteFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The PDF structure could not be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error for a single attempt.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// Every attempt at the remote call failed or timed out.
    #[error("Remote service failed after {attempts} attempt(s): {last_error}")]
    RemoteServiceFailed { attempts: u32, last_error: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The document encoder rejected the content.
    #[error("Failed to render {format} document: {detail}")]
    RenderFailed { format: &'static str, detail: String },

    /// Could not write the generated artifact to the output directory.
    #[error("Failed to write output file '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact existed but could not be read back for sending.
    #[error("Failed to send output file '{path}': {source}")]
    DeliveryFailed {
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

impl PdfSectionError {
    /// The coarse category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use PdfSectionError::*;
        match self {
            MissingField { .. } | UploadTooLarge { .. } | MalformedUpload { .. } => {
                ErrorKind::Validation
            }
            NotAPdf { .. } | CorruptPdf { .. } => ErrorKind::Parse,
            ProviderNotConfigured { .. } | LlmApiError { .. } | RemoteServiceFailed { .. } => {
                ErrorKind::RemoteService
            }
            FileNotFound { .. }
            | PermissionDenied { .. }
            | InvalidInput { .. }
            | DownloadFailed { .. }
            | DownloadTimeout { .. }
            | UploadWriteFailed { .. }
            | RenderFailed { .. }
            | ArtifactWriteFailed { .. } => ErrorKind::Io,
            DeliveryFailed { .. } => ErrorKind::Download,
            InvalidConfig(_) => ErrorKind::Config,
            Internal(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller sent a bad request rather than the pipeline failing.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
