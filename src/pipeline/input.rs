//! Input resolution for the `extract` command: a local path or an HTTP(S) URL.
//!
//! URLs are fetched into a private [`TempDir`] that lives inside the returned
//! [`PdfSource`], so the downloaded copy disappears when the run finishes.
//! The `%PDF` check is left to the text extractor; this module only
//! establishes that there is a readable file to hand it.

use crate::error::PdfSectionError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

const FALLBACK_NAME: &str = "download.pdf";

/// A PDF that is readable from the local filesystem.
#[derive(Debug)]
pub enum PdfSource {
    /// The caller named a file on disk.
    Local(PathBuf),
    /// The caller named a URL; the body was saved under `_dir`.
    Fetched {
        url: String,
        path: PathBuf,
        _dir: TempDir,
    },
}

impl PdfSource {
    pub fn path(&self) -> &Path {
        match self {
            PdfSource::Local(p) => p,
            PdfSource::Fetched { path, .. } => path,
        }
    }

    /// What the user typed, for log lines and JSON output.
    pub fn origin(&self) -> String {
        match self {
            PdfSource::Local(p) => p.display().to_string(),
            PdfSource::Fetched { url, .. } => url.clone(),
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Turn `input` into a [`PdfSource`], downloading it first when it is a URL.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<PdfSource, PdfSectionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PdfSectionError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        fetch(input, timeout_secs).await
    } else {
        local(input).await
    }
}

async fn local(input: &str) -> Result<PdfSource, PdfSectionError> {
    let path = PathBuf::from(input);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {
            debug!("Using local PDF {} ({} bytes)", path.display(), meta.len());
            Ok(PdfSource::Local(path))
        }
        Ok(_) => Err(PdfSectionError::InvalidInput {
            input: input.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(PdfSectionError::PermissionDenied { path })
        }
        Err(_) => Err(PdfSectionError::FileNotFound { path }),
    }
}

async fn fetch(url: &str, timeout_secs: u64) -> Result<PdfSource, PdfSectionError> {
    let failed = |reason: String| PdfSectionError::DownloadFailed {
        url: url.to_string(),
        reason,
    };
    let parsed = reqwest::Url::parse(url).map_err(|_| PdfSectionError::InvalidInput {
        input: url.to_string(),
    })?;

    info!("Downloading {}", url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(parsed.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfSectionError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {status}")));
    }

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            PdfSectionError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    let dir = TempDir::new().map_err(|e| PdfSectionError::Internal(e.to_string()))?;
    let path = dir.path().join(file_name_for(&parsed));
    tokio::fs::write(&path, &body)
        .await
        .map_err(|e| PdfSectionError::Internal(format!("Failed to save download: {e}")))?;

    info!("Saved {} bytes to {}", body.len(), path.display());
    Ok(PdfSource::Fetched {
        url: url.to_string(),
        path,
        _dir: dir,
    })
}

/// Last path segment when it looks like a file name, else a fixed fallback.
fn file_name_for(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}
