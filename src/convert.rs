//! Pipeline entry points.
//!
//! [`extract_section`] runs every stage against a PDF that is already on
//! disk and is what the HTTP handler calls for each upload.
//! [`extract_from_input`] is the CLI's variant: it resolves a path or URL
//! first and builds the Gemini generator when none was injected.

use crate::config::ExtractionConfig;
use crate::error::PdfSectionError;
use crate::output::ExtractionOutcome;
use crate::pipeline::llm::{GeminiGenerator, TextGenerator};
use crate::pipeline::{classify, extract, input, llm, render};
use crate::progress::Stage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The generator a run should use: the injected one, else Gemini from the
/// environment.
pub fn resolve_generator(
    config: &ExtractionConfig,
) -> Result<Arc<dyn TextGenerator>, PdfSectionError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }
    Ok(Arc::new(GeminiGenerator::from_env()?))
}

/// Find `heading` in the PDF at `pdf_path` and render what the model
/// returns into `config.output_dir`.
///
/// # Errors
/// - `MissingField` when `heading` is blank
/// - `NotAPdf` / `CorruptPdf` when text extraction fails
/// - `RemoteServiceFailed` when every remote attempt fails
/// - `RenderFailed` / `ArtifactWriteFailed` when the artifact cannot be written
///
/// The answer is classified and, when narrative, rendered exactly as the
/// model returned it. No artifact exists unless this returns `Ok`.
pub async fn extract_section(
    pdf_path: &Path,
    heading: &str,
    generator: &Arc<dyn TextGenerator>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome, PdfSectionError> {
    let total_start = Instant::now();
    let heading = heading.trim();
    if heading.is_empty() {
        return Err(PdfSectionError::MissingField { field: "heading" });
    }
    info!("Extracting {:?} from {}", heading, pdf_path.display());

    // ── Step 1: Extract text ─────────────────────────────────────────────
    stage_start(config, Stage::ExtractText);
    let text = extract::extract_text(pdf_path).await?;
    stage_complete(config, Stage::ExtractText);

    // ── Step 2: Locate content ───────────────────────────────────────────
    stage_start(config, Stage::LocateContent);
    let answer = llm::locate_content(generator, heading, &text, config).await?;
    debug!("Answer: {} chars", answer.text.len());
    stage_complete(config, Stage::LocateContent);

    // ── Step 3: Classify ─────────────────────────────────────────────────
    stage_start(config, Stage::Classify);
    let shape = classify::classify(&answer.text);
    info!("Answer classified as {:?}", shape);
    stage_complete(config, Stage::Classify);

    // ── Step 4: Render ───────────────────────────────────────────────────
    stage_start(config, Stage::Render);
    let artifact = render::render_artifact(shape, &answer.text, &config.output_dir).await?;
    stage_complete(config, Stage::Render);

    let total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Produced {} in {}ms ({} in / {} out tokens)",
        artifact.file_name, total_duration_ms, answer.input_tokens, answer.output_tokens
    );

    Ok(ExtractionOutcome {
        heading: heading.to_string(),
        shape,
        answer,
        artifact,
        extracted_chars: text.chars().count(),
        total_duration_ms,
    })
}

/// Resolve `input` (local path or HTTP(S) URL) and run [`extract_section`].
///
/// A downloaded copy is removed before this returns; the artifact is kept.
pub async fn extract_from_input(
    input_str: impl AsRef<str>,
    heading: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome, PdfSectionError> {
    let source = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let generator = resolve_generator(config)?;
    debug!("Using generator {} for {}", generator.name(), source.origin());
    extract_section(source.path(), heading, &generator, config).await
}

fn stage_start(config: &ExtractionConfig, stage: Stage) {
    debug!("Stage start: {}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &ExtractionConfig, stage: Stage) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage);
    }
}
