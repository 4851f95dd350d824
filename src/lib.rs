//! # edgequake-pdfsection
//!
//! Pull the content under one heading out of a PDF and hand it back as a
//! spreadsheet or a Word document.
//!
//! A PDF's text is extracted locally, then a Gemini model is asked to return
//! whatever sits under the requested heading. Answers the model marks with
//! `Table:` become an `.xlsx` workbook; everything else becomes a `.docx`
//! document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF + heading
//!  │
//!  ├─ 1. Upload    stage the multipart file under uploads/ (server only)
//!  ├─ 2. Extract   plain text via pdf-extract (spawn_blocking)
//!  ├─ 3. Locate    one prompt to gemini-1.5-flash, timeout + bounded retry
//!  ├─ 4. Classify  "Table:" in the raw answer → spreadsheet, otherwise document
//!  ├─ 5. Render    rust_xlsxwriter / docx-rs into output/ (tables are
//!  │               cleaned of fences and CRLF first; prose is kept verbatim)
//!  └─ 6. Send      stream the file back, then delete it
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfsection::{extract_from_input, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini credential read from GEMINI_API_KEY
//!     let config = ExtractionConfig::builder().output_dir(".").build()?;
//!     let outcome = extract_from_input("report.pdf", "Summary", &config).await?;
//!     println!("{} → {}", outcome.heading, outcome.artifact.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsection` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` to embed only the library and the axum router:
//! ```toml
//! edgequake-pdfsection = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use convert::{extract_from_input, extract_section, resolve_generator};
pub use error::{ErrorKind, PdfSectionError};
pub use output::{ArtifactKind, ExtractionOutcome, OutputArtifact};
pub use pipeline::classify::{classify, ContentShape};
pub use pipeline::llm::{GeminiGenerator, Generation, GenerationOptions, TextGenerator};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use server::{router, serve, AppState};
