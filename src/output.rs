//! Output types returned by the extraction pipeline.

use crate::pipeline::classify::ContentShape;
use crate::pipeline::llm::GeneratedAnswer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which kind of file an [`OutputArtifact`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `.xlsx` workbook, produced for tabular answers.
    Spreadsheet,
    /// `.docx` document, produced for narrative answers.
    Document,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Spreadsheet => "xlsx",
            ArtifactKind::Document => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ArtifactKind::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ArtifactKind::Document => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Short label used in user-facing download errors.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Spreadsheet => "Excel",
            ArtifactKind::Document => "DOC",
        }
    }
}

impl From<ContentShape> for ArtifactKind {
    fn from(shape: ContentShape) -> Self {
        match shape {
            ContentShape::Tabular => ArtifactKind::Spreadsheet,
            ContentShape::Narrative => ArtifactKind::Document,
        }
    }
}

/// A generated file in the output directory.
///
/// The holder owns the file on disk. [`OutputArtifact::remove`] deletes it and
/// is safe to call more than once.
#[derive(Debug, Serialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
    /// Generated name, also used as the download filename.
    pub file_name: String,
    pub kind: ArtifactKind,
    pub size_bytes: u64,
    #[serde(skip)]
    removed: bool,
}

impl OutputArtifact {
    pub(crate) fn new(path: PathBuf, kind: ArtifactKind, size_bytes: u64) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            kind,
            size_bytes,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. A second call, or a file already gone, is a no-op.
    pub async fn remove(&mut self) -> std::io::Result<()> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed artifact {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to remove artifact {}: {}", self.path.display(), e);
                Err(e)
            }
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Serialize)]
pub struct ExtractionOutcome {
    pub heading: String,
    pub shape: ContentShape,
    pub answer: GeneratedAnswer,
    pub artifact: OutputArtifact,
    /// Characters of text pulled from the PDF.
    pub extracted_chars: usize,
    pub total_duration_ms: u64,
}
