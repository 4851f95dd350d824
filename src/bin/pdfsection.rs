//! CLI binary for edgequake-pdfsection.
//!
//! `serve` runs the upload server; `extract` runs the pipeline once against a
//! local file or URL and leaves the artifact on disk. Both are thin shims
//! that map flags to `ExtractionConfig`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdfsection::{
    extract_from_input, serve, AppState, ArtifactKind, ExtractionConfig, ExtractionConfigBuilder,
    PipelineProgressCallback, ProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ─────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ───────────────────────────────────

/// Spinner that shows the current pipeline stage and prints retries above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        let hint = match stage {
            Stage::ExtractText => "reading PDF…",
            Stage::LocateContent => "waiting for Gemini…",
            Stage::Classify => "",
            Stage::Render => "writing file…",
        };
        self.bar.set_message(hint);
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.bar.println(format!("  {} {}", green("✓"), stage));
    }

    fn on_attempt_failed(&self, attempt: u32, max_attempts: u32, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}…", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} attempt {}/{} failed  {}",
            yellow("!"),
            attempt,
            max_attempts,
            dim(&msg)
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the upload server on port 3000
  pdfsection serve

  # Pull one section out of a local file
  pdfsection extract report.pdf --heading "Summary"

  # From a URL, artifact written to ./out, JSON summary on stdout
  pdfsection extract https://example.com/q3.pdf --heading "Revenue" -o out --json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY             Google Gemini API key (required)
  PORT                       Server port (default 3000)
  PDFSECTION_HOST            Server bind address (default 0.0.0.0)
  PDFSECTION_UPLOAD_DIR      Where uploads are staged (default uploads)
  PDFSECTION_OUTPUT_DIR      Where artifacts are written (default output)
  PDFSECTION_API_TIMEOUT     Per-attempt Gemini timeout in seconds (default 60)
  PDFSECTION_MAX_RETRIES     Retries after a failed Gemini call (default 2)
  PDFSECTION_MAX_UPLOAD_MB   Largest accepted upload (default 25)
  RUST_LOG                   Overrides --verbose / --quiet
"#;

/// Extract the content under a heading from a PDF into .xlsx or .docx.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsection",
    version,
    about = "Extract the content under a heading from a PDF into .xlsx or .docx",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFSECTION_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFSECTION_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form and POST /upload-pdf.
    Serve(ServeArgs),
    /// Run the pipeline once and keep the generated file.
    Extract(ExtractArgs),
}

/// Knobs shared by both subcommands.
#[derive(Args, Debug)]
struct PipelineArgs {
    /// Per-attempt Gemini timeout in seconds.
    #[arg(long, env = "PDFSECTION_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Retries after a failed or timed-out Gemini call (0–10).
    #[arg(long, env = "PDFSECTION_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Max tokens the model may generate.
    #[arg(long, env = "PDFSECTION_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDFSECTION_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "PDFSECTION_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Directory uploads are staged in (created if missing).
    #[arg(long, env = "PDFSECTION_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory artifacts are written to (created if missing).
    #[arg(long, env = "PDFSECTION_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Largest accepted upload in MiB.
    #[arg(long, env = "PDFSECTION_MAX_UPLOAD_MB", default_value_t = 25)]
    max_upload_mb: u64,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Heading whose content should be extracted.
    #[arg(long)]
    heading: String,

    /// Directory the artifact is written to (must exist).
    #[arg(short, long, env = "PDFSECTION_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFSECTION_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFSECTION_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // A running spinner owns the terminal; library INFO lines would tear it.
    let spinner = match &cli.command {
        Command::Extract(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Extract(args) => run_extract(args, spinner, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    for dir in [&args.upload_dir, &args.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config = pipeline_builder(&args.pipeline)
        .upload_dir(&args.upload_dir)
        .output_dir(&args.output_dir)
        .max_upload_bytes(args.max_upload_mb.saturating_mul(1024 * 1024))
        .build()
        .context("Invalid configuration")?;

    let state = AppState::new(config).context("Failed to initialise the Gemini provider")?;
    let addr = SocketAddr::new(args.host, args.port);
    serve(addr, state).await.context("Server failed")?;
    Ok(())
}

async fn run_extract(args: ExtractArgs, spinner: bool, quiet: bool) -> Result<()> {
    let progress = spinner.then(CliProgressCallback::new);

    let mut builder = pipeline_builder(&args.pipeline)
        .output_dir(&args.output_dir)
        .download_timeout_secs(args.download_timeout);
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    let result = extract_from_input(&args.input, &args.heading, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let outcome = result.context("Extraction failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else if !quiet {
        let format = match outcome.artifact.kind {
            ArtifactKind::Spreadsheet => "spreadsheet",
            ArtifactKind::Document => "document",
        };
        eprintln!(
            "{} {} {}  →  {}",
            green("✔"),
            format,
            dim(&format!("({} bytes)", outcome.artifact.size_bytes)),
            bold(&outcome.artifact.path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out  /  {}ms total",
            dim(&outcome.answer.input_tokens.to_string()),
            dim(&outcome.answer.output_tokens.to_string()),
            outcome.total_duration_ms,
        );
    }

    Ok(())
}

fn pipeline_builder(args: &PipelineArgs) -> ExtractionConfigBuilder {
    ExtractionConfig::builder()
        .api_timeout_secs(args.api_timeout)
        .max_retries(args.max_retries)
        .max_tokens(args.max_tokens)
        .temperature(args.temperature)
}
