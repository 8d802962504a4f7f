//! CLI binary for chart-insight.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `OcrConfig` / `InsightConfig`, runs one analysis and prints the result.

use anyhow::{Context, Result};
use chart_insight::{
    AnalysisProgressCallback, AnalyzeResponse, ChartInsight, ChartType, InsightConfig, OcrConfig,
    OcrEngine, ProgressCallback,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that narrates the analysis stages on stderr.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(first_step: &str) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message(first_step.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_ocr_start(&self, png_len: usize) {
        self.bar.set_prefix("OCR");
        self.bar
            .set_message(format!("Extracting chart text ({} KiB)…", png_len / 1024));
    }

    fn on_ocr_complete(&self, text_len: usize) {
        self.bar.println(format!(
            "  {} OCR  {}",
            green("✓"),
            dim(&format!("{text_len} chars"))
        ));
    }

    fn on_answer_start(&self, chart_type: ChartType) {
        self.bar.set_prefix("Analyzing");
        self.bar.set_message(format!("Asking the model about a {chart_type}…"));
    }

    fn on_analysis_complete(&self, _answer_len: usize) {
        self.bar.finish_and_clear();
    }

    fn on_analysis_error(&self, kind: &str, error: &str) {
        self.bar.finish_and_clear();
        let msg = if error.len() > 100 {
            format!("{}\u{2026}", error.chars().take(99).collect::<String>())
        } else {
            error.to_string()
        };
        eprintln!("{} {} {}", red("✗"), bold(kind), red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ask a question about a chart
  chart-insight sales.png -q "Which quarter had higher sales?"

  # Print the /analyze JSON payload
  chart-insight sales.png -q "What is the largest slice?" --json

  # Only run OCR and print the extracted text
  chart-insight sales.png --ocr-only

  # Skip OCR: answer from text you already have
  chart-insight --ocr-text "Bar Chart: Q1 sales 100, Q2 sales 150" -q "Which quarter won?"

  # Use a specific provider and model
  chart-insight sales.png -q "Trend?" --provider anthropic --model claude-sonnet-4-20250514

ENVIRONMENT VARIABLES:
  AZURE_OCR_ENDPOINT      Azure Computer Vision endpoint
  AZURE_OCR_KEY           Azure Computer Vision subscription key
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
"#;

/// Answer questions about chart images using OCR and an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "chart-insight",
    version,
    about = "Answer questions about chart images using OCR and an LLM",
    long_about = "Extract the text of a chart image with Azure Read OCR, then ask a language \
model to answer a question using only that text. Supports OpenAI, Anthropic, Google Gemini, \
Azure OpenAI, and any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Chart image (PNG or JPEG).
    #[arg(required_unless_present = "ocr_text")]
    image: Option<PathBuf>,

    /// Question about the chart.
    #[arg(short, long, required_unless_present = "ocr_only")]
    question: Option<String>,

    /// Use this text instead of running OCR on an image.
    #[arg(long, conflicts_with_all = ["image", "ocr_only"])]
    ocr_text: Option<String>,

    /// Run OCR only and print the extracted text.
    #[arg(long)]
    ocr_only: bool,

    /// Azure Computer Vision endpoint.
    #[arg(long, env = "AZURE_OCR_ENDPOINT")]
    azure_endpoint: Option<String>,

    /// Azure Computer Vision subscription key.
    #[arg(long, env = "AZURE_OCR_KEY", hide_env_values = true)]
    azure_key: Option<String>,

    /// OCR language hint.
    #[arg(long, env = "CHART_INSIGHT_OCR_LANGUAGE", default_value = "en")]
    ocr_language: String,

    /// Delay between OCR status polls in milliseconds.
    #[arg(long, env = "CHART_INSIGHT_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Give up on OCR after this many seconds.
    #[arg(long, env = "CHART_INSIGHT_OCR_TIMEOUT", default_value_t = 60)]
    ocr_timeout: u64,

    /// Maximum number of OCR status polls.
    #[arg(long, env = "CHART_INSIGHT_MAX_POLLS", default_value_t = 120)]
    max_polls: u32,

    /// LLM model ID (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "CHART_INSIGHT_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "CHART_INSIGHT_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "CHART_INSIGHT_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// LLM call timeout in seconds.
    #[arg(long, env = "CHART_INSIGHT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output the /analyze JSON payload instead of plain text.
    #[arg(long, env = "CHART_INSIGHT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CHART_INSIGHT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CHART_INSIGHT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the answer and errors.
    #[arg(short = 'Q', long, env = "CHART_INSIGHT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner narrates progress, so library INFO logs are suppressed
    // while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    let ocr_config = build_ocr_config(&cli)?;

    // ── OCR-only mode ────────────────────────────────────────────────────
    if cli.ocr_only {
        let path = cli.image.as_ref().context("an image is required with --ocr-only")?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {:?}", path))?;
        let img = chart_insight::pipeline::image::decode_image(&bytes)?;
        let png = chart_insight::pipeline::image::encode_png(&img)?;
        let client = chart_insight::AzureReadClient::new(ocr_config)?;
        let text = client.extract_text(png).await.context("OCR failed")?;
        println!("{text}");
        return Ok(());
    }

    let config = build_config(&cli).await?;
    let progress: Option<ProgressCallback> = if show_progress {
        let first_step = if cli.ocr_text.is_some() {
            "Building prompt…"
        } else {
            "Decoding image…"
        };
        Some(CliProgressCallback::new(first_step) as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let mut engine = ChartInsight::from_config(ocr_config, config)
        .context("Failed to initialise LLM provider")?;
    if let Some(cb) = progress {
        engine = engine.with_progress(cb);
    }

    let question = cli.question.clone().unwrap_or_default();

    let result = if let Some(ref ocr_text) = cli.ocr_text {
        // ── Text-only mode ───────────────────────────────────────────────
        engine.analyze_text(ocr_text, &question).await
    } else {
        // ── Image mode ───────────────────────────────────────────────────
        let path = cli.image.as_ref().context("an image path is required")?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {:?}", path))?;
        engine.analyze(&bytes, &question).await
    };

    if cli.json {
        let response = AnalyzeResponse::from(result);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Failed to serialise output")?
        );
        if response.is_error() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let analysis = result.context("Analysis failed")?;
    if !cli.quiet {
        eprintln!("{}", bold("OCR text:"));
        eprintln!("{}", dim(&analysis.ocr_text));
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(analysis.chart_type.as_str()),
            dim(&format!(
                "{}ms OCR / {}ms LLM  ·  {} tokens in / {} out",
                analysis.stats.ocr_duration_ms,
                analysis.stats.llm_duration_ms,
                analysis.stats.input_tokens,
                analysis.stats.output_tokens
            )),
        );
    }
    println!("{}", analysis.answer);

    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_ocr_config(cli: &Cli) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder()
        .language(cli.ocr_language.clone())
        .poll_interval_ms(cli.poll_interval_ms)
        .max_wait_secs(cli.ocr_timeout)
        .max_polls(cli.max_polls);
    if let Some(ref endpoint) = cli.azure_endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    if let Some(ref key) = cli.azure_key {
        builder = builder.api_key(key.clone());
    }
    builder.build().context("Invalid OCR configuration")
}

/// Map CLI args to `InsightConfig`.
async fn build_config(cli: &Cli) -> Result<InsightConfig> {
    let mut builder = InsightConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }

    builder.build().context("Invalid configuration")
}
