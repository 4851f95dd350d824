//! Content locator: ask the remote model for the text under a heading.
//!
//! The pipeline talks to a [`TextGenerator`], not to a provider directly.
//! Production uses [`GeminiGenerator`], a thin adapter over
//! `edgequake-llm`'s Gemini provider; tests inject their own generator via
//! [`crate::config::ExtractionConfig::generator`].
//!
//! ## Retry Strategy
//!
//! Each attempt is bounded by `api_timeout_secs`. A failed or timed-out
//! attempt is retried after `retry_backoff_ms * 2^(attempt-1)`; with the
//! defaults (500 ms, 2 retries) the waits are 500 ms → 1 s. Once attempts run
//! out the last error is returned as
//! [`PdfSectionError::RemoteServiceFailed`].

use crate::config::ExtractionConfig;
use crate::error::PdfSectionError;
use crate::prompts::locate_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Provider name handed to the `edgequake-llm` factory.
pub const GEMINI_PROVIDER: &str = "gemini";

/// The one model the locator uses.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Sampling knobs for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl From<&ExtractionConfig> for GenerationOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Raw output of a single successful generation call.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// A remote (or fake) text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in logs, e.g. `"gemini/gemini-1.5-flash"`.
    fn name(&self) -> &str;

    /// Send one prompt and wait for one textual answer.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, PdfSectionError>;
}

/// [`TextGenerator`] backed by an `edgequake-llm` provider.
pub struct GeminiGenerator {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl GeminiGenerator {
    /// Wrap an already-built provider.
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            label: format!("{GEMINI_PROVIDER}/{GEMINI_MODEL}"),
        }
    }

    /// Build the Gemini provider from the environment (`GEMINI_API_KEY`).
    pub fn from_env() -> Result<Self, PdfSectionError> {
        let provider =
            ProviderFactory::create_llm_provider(GEMINI_PROVIDER, GEMINI_MODEL).map_err(|e| {
                PdfSectionError::ProviderNotConfigured {
                    provider: GEMINI_PROVIDER.to_string(),
                    hint: format!("Set GEMINI_API_KEY to a valid Google AI Studio key.\n{e}"),
                }
            })?;
        Ok(Self::new(provider))
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, PdfSectionError> {
        let messages = vec![ChatMessage::user(prompt)];
        let completion = CompletionOptions {
            temperature: Some(options.temperature),
            max_tokens: Some(options.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&completion))
            .await
            .map_err(|e| PdfSectionError::LlmApiError {
                message: e.to_string(),
            })?;

        Ok(Generation {
            content: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// The model's answer for one heading, with call statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedAnswer {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// 1-indexed attempt that succeeded.
    pub attempts: u32,
    pub duration_ms: u64,
}

/// Ask `generator` for the content under `heading` in `text`.
///
/// Exactly one prompt is built; it is re-sent only when an attempt fails or
/// times out.
pub async fn locate_content(
    generator: &Arc<dyn TextGenerator>,
    heading: &str,
    text: &str,
    config: &ExtractionConfig,
) -> Result<GeneratedAnswer, PdfSectionError> {
    let start = Instant::now();
    let prompt = locate_prompt(heading, text);
    let options = GenerationOptions::from(config);
    let max_attempts = config.max_attempts();
    let per_attempt = Duration::from_secs(config.api_timeout_secs);

    info!(
        "Locating heading {:?} via {} ({} chars of text)",
        heading,
        generator.name(),
        text.len()
    );

    let mut last_err: Option<String> = None;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Retry {}/{} after {}ms",
                attempt - 1,
                config.max_retries,
                backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let outcome = match timeout(per_attempt, generator.generate(&prompt, &options)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                config.api_timeout_secs
            )),
        };

        match outcome {
            Ok(generation) => {
                let duration = start.elapsed();
                debug!(
                    "{} input tokens, {} output tokens, {:?}",
                    generation.input_tokens, generation.output_tokens, duration
                );
                return Ok(GeneratedAnswer {
                    text: generation.content,
                    input_tokens: generation.input_tokens,
                    output_tokens: generation.output_tokens,
                    attempts: attempt,
                    duration_ms: duration.as_millis() as u64,
                });
            }
            Err(err_msg) => {
                warn!("Attempt {} failed: {}", attempt, err_msg);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_attempt_failed(attempt, max_attempts, &err_msg);
                }
                last_err = Some(err_msg);
            }
        }
    }

    Err(PdfSectionError::RemoteServiceFailed {
        attempts: max_attempts,
        last_error: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Delay before `attempt` (1-indexed; attempt 1 never waits).
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(2).min(16);
    base_ms.saturating_mul(2u64.pow(exp))
}
