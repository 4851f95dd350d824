//! Configuration types for heading extraction.
//!
//! Everything the pipeline needs at run time lives in [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. The server builds one at start-up
//! and shares it behind an `Arc`; nothing is read from global state once a
//! request is running.
//!
//! The remote model is not part of the configuration: the locator always
//! talks to [`crate::pipeline::llm::GEMINI_MODEL`]. The credential is read by
//! the provider factory from `GEMINI_API_KEY`.

use crate::error::PdfSectionError;
use crate::pipeline::llm::TextGenerator;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a heading-extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdfsection::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .output_dir("/srv/pdfsection/output")
///     .api_timeout_secs(30)
///     .max_retries(1)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory uploaded PDFs are staged in. Default: `uploads`.
    pub upload_dir: PathBuf,

    /// Directory generated `.xlsx` / `.docx` files are written to. Default: `output`.
    ///
    /// Must exist before rendering; the renderers never create it.
    pub output_dir: PathBuf,

    /// Pre-constructed text generator. Takes precedence over the Gemini provider.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Sampling temperature for the LLM completion. Default: 0.1.
    ///
    /// The model should quote the document, not paraphrase it.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 4096.
    pub max_tokens: usize,

    /// Retries after a failed or timed-out remote attempt. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per retry. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-attempt timeout for the remote call in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Largest accepted upload in bytes. Default: 25 MiB.
    pub max_upload_bytes: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback for stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            generator: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            max_upload_bytes: 25 * 1024 * 1024,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("upload_dir", &self.upload_dir)
            .field("output_dir", &self.output_dir)
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Total remote attempts allowed (first try plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PdfSectionError> {
        let c = &self.config;
        if c.api_timeout_secs == 0 {
            return Err(PdfSectionError::InvalidConfig(
                "API timeout must be at least 1 second".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PdfSectionError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(PdfSectionError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.max_retries > 10 {
            return Err(PdfSectionError::InvalidConfig(format!(
                "max_retries must be 0–10, got {}",
                c.max_retries
            )));
        }
        Ok(self.config)
    }
}
