//! # chart-insight
//!
//! Ask natural-language questions about chart images.
//!
//! ## How it works
//!
//! A chart image is sent to an OCR service (Azure Read) to recover its
//! labels, legends and values as plain text. That text, the question and a
//! guessed chart type are then given to a language model with an instruction
//! to answer only from the extracted data.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image + question
//!  │
//!  ├─ 1. Decode     PNG/JPEG → RGB → PNG bytes
//!  ├─ 2. OCR        Azure Read, bounded polling
//!  ├─ 3. Normalize  trim the question
//!  ├─ 4. Validate   empty OCR text → clarification, no model call
//!  ├─ 5. Classify   pie / bar / line keyword heuristic
//!  ├─ 6. Generate   one LLM round trip (OpenAI / Anthropic / Gemini / Ollama / …)
//!  └─ 7. Cleanup    repair run-together words in the answer
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chart_insight::{AnalyzeResponse, ChartInsight, InsightConfig, OcrConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ocr = OcrConfig::builder()
//!         .endpoint(std::env::var("AZURE_OCR_ENDPOINT")?)
//!         .api_key(std::env::var("AZURE_OCR_KEY")?)
//!         .build()?;
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let engine = ChartInsight::from_config(ocr, InsightConfig::default())?;
//!
//!     let image = std::fs::read("sales.png")?;
//!     let response: AnalyzeResponse = engine
//!         .analyze(&image, "Which quarter had higher sales?")
//!         .await
//!         .into();
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! Already have the OCR text? Skip the image entirely with
//! [`ChartInsight::run`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `chart-insight` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod engine;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_image, analyze_response, analyze_text};
pub use config::{InsightConfig, InsightConfigBuilder, OcrConfig, OcrConfigBuilder};
pub use engine::{resolve_provider, ChartInsight};
pub use error::{InsightError, OcrError};
pub use ocr::{AzureReadClient, OcrEngine};
pub use output::{Analysis, AnalysisStats, AnalyzeResponse};
pub use pipeline::classify::{classify_chart_text, ChartType};
pub use pipeline::context::PipelineContext;
pub use pipeline::llm::{AnswerModel, ModelReply};
pub use pipeline::postprocess::clean_answer;
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
