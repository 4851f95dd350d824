//! Document rendering: answer text → `.xlsx` workbook or `.docx` document.
//!
//! Both renderers encode into memory first and only then write the file, so
//! an encoder failure never leaves a half-written artifact behind, and an
//! I/O failure (typically a missing output directory) surfaces as
//! [`PdfSectionError::ArtifactWriteFailed`] with the real `io::Error`.
//!
//! The output directory must already exist; it is never created here.

use crate::error::PdfSectionError;
use crate::output::{ArtifactKind, OutputArtifact};
use crate::pipeline::classify::ContentShape;
use crate::pipeline::table::{parse_table, TableGrid};
use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use rust_xlsxwriter::{DocProperties, Workbook, XlsxError};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the single worksheet, and the document's heading text.
pub const CONTENT_TITLE: &str = "Extracted Content";

/// Prefix of every generated file name.
pub const FILE_PREFIX: &str = "Extracted_Content_";

const HEADING_STYLE_ID: &str = "Heading1";

/// Render `answer` in the shape the classifier picked and write it under
/// `output_dir`.
///
/// Runs the encoders on the blocking pool.
pub async fn render_artifact(
    shape: ContentShape,
    answer: &str,
    output_dir: &Path,
) -> Result<OutputArtifact, PdfSectionError> {
    let answer = answer.to_string();
    let dir = output_dir.to_path_buf();

    tokio::task::spawn_blocking(move || match shape {
        ContentShape::Tabular => write_workbook(&parse_table(&answer)?, &dir),
        ContentShape::Narrative => write_document(&answer, &dir),
    })
    .await
    .map_err(|e| PdfSectionError::Internal(format!("Render task panicked: {e}")))?
}

/// Write `grid` as a single-sheet workbook.
pub fn write_workbook(grid: &TableGrid, output_dir: &Path) -> Result<OutputArtifact, PdfSectionError> {
    let bytes = encode_workbook(grid)?;
    let path = artifact_path(output_dir, ArtifactKind::Spreadsheet);
    write_artifact(path, &bytes, ArtifactKind::Spreadsheet)
}

/// Write `content` as a document with an "Extracted Content" heading.
pub fn write_document(content: &str, output_dir: &Path) -> Result<OutputArtifact, PdfSectionError> {
    let bytes = encode_document(content)?;
    let path = artifact_path(output_dir, ArtifactKind::Document);
    write_artifact(path, &bytes, ArtifactKind::Document)
}

fn encode_workbook(grid: &TableGrid) -> Result<Vec<u8>, PdfSectionError> {
    let mut workbook = Workbook::new();

    if let Some(ref caption) = grid.caption {
        let properties = DocProperties::new().set_title(caption.as_str());
        workbook.set_properties(&properties);
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(CONTENT_TITLE).map_err(xlsx_error)?;

    for (r, row) in grid.rows.iter().enumerate() {
        let r = u32::try_from(r).map_err(|_| too_many("rows"))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).map_err(|_| too_many("columns"))?;
            worksheet
                .write_string(r, c, cell.as_str())
                .map_err(xlsx_error)?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    debug!(
        "Encoded workbook: {} rows × {} cols → {} bytes",
        grid.rows.len(),
        grid.width(),
        bytes.len()
    );
    Ok(bytes)
}

fn encode_document(content: &str) -> Result<Vec<u8>, PdfSectionError> {
    let heading_style = Style::new(HEADING_STYLE_ID, StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    // One paragraph for the whole answer; source newlines become line breaks.
    let mut body = Run::new();
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            body = body.add_break(BreakType::TextWrapping);
        }
        body = body.add_text(line);
    }

    let docx = Docx::new()
        .add_style(heading_style)
        .add_paragraph(
            Paragraph::new()
                .style(HEADING_STYLE_ID)
                .add_run(Run::new().add_text(CONTENT_TITLE)),
        )
        .add_paragraph(Paragraph::new().add_run(body));

    let mut bytes = Vec::new();
    docx.build()
        .pack(Cursor::new(&mut bytes))
        .map_err(|e| PdfSectionError::RenderFailed {
            format: "docx",
            detail: e.to_string(),
        })?;
    debug!("Encoded document: {} chars → {} bytes", content.len(), bytes.len());
    Ok(bytes)
}

/// `<dir>/Extracted_Content_<unix-millis>.<ext>`
fn artifact_path(output_dir: &Path, kind: ArtifactKind) -> PathBuf {
    let millis = chrono::Utc::now().timestamp_millis();
    output_dir.join(format!("{FILE_PREFIX}{millis}.{}", kind.extension()))
}

fn write_artifact(
    path: PathBuf,
    bytes: &[u8],
    kind: ArtifactKind,
) -> Result<OutputArtifact, PdfSectionError> {
    std::fs::write(&path, bytes).map_err(|e| PdfSectionError::ArtifactWriteFailed {
        path: path.clone(),
        source: e,
    })?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(OutputArtifact::new(path, kind, bytes.len() as u64))
}

fn xlsx_error(e: XlsxError) -> PdfSectionError {
    PdfSectionError::RenderFailed {
        format: "xlsx",
        detail: e.to_string(),
    }
}

fn too_many(what: &str) -> PdfSectionError {
    PdfSectionError::RenderFailed {
        format: "xlsx",
        detail: format!("too many {what} for a worksheet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_carry_prefix_and_extension() {
        let p = artifact_path(Path::new("out"), ArtifactKind::Spreadsheet);
        let name = p.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(FILE_PREFIX), "got {name}");
        assert!(name.ends_with(".xlsx"));
        let stamp = &name[FILE_PREFIX.len()..name.len() - ".xlsx".len()];
        assert!(stamp.parse::<i64>().is_ok(), "timestamp not numeric: {stamp}");
        assert_eq!(p.parent(), Some(Path::new("out")));
    }

    #[test]
    fn workbook_encodes_to_zip() {
        let grid = TableGrid {
            caption: Some("Staff".into()),
            rows: vec![vec!["Name".into(), "Age".into()]],
        };
        let bytes = encode_workbook(&grid).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn document_encodes_to_zip() {
        let bytes = encode_document("line one\nline two").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn missing_output_dir_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let err = write_document("Total: 42", &missing).unwrap_err();
        assert!(
            matches!(err, PdfSectionError::ArtifactWriteFailed { .. }),
            "unexpected: {err:?}"
        );
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn render_picks_extension_from_shape() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = render_artifact(ContentShape::Tabular, "Table:\nA,B", dir.path())
            .await
            .unwrap();
        assert_eq!(xlsx.kind, ArtifactKind::Spreadsheet);
        assert!(xlsx.file_name.ends_with(".xlsx"));
        assert!(xlsx.path().exists());

        let docx = render_artifact(ContentShape::Narrative, "prose", dir.path())
            .await
            .unwrap();
        assert_eq!(docx.kind, ArtifactKind::Document);
        assert!(docx.file_name.ends_with(".docx"));
        assert!(docx.size_bytes > 0);
    }
}
