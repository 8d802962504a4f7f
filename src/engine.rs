//! The pipeline engine: OCR text + question → answer.
//!
//! [`ChartInsight`] owns the two external collaborators (an [`OcrEngine`]
//! and an [`AnswerModel`]) together with the [`InsightConfig`]. It is
//! stateless between calls: every `run` builds a fresh typed context, walks
//! it through the four steps, and drops it once the answer is extracted.

use crate::analyze;
use crate::config::{InsightConfig, OcrConfig};
use crate::error::InsightError;
use crate::ocr::{AzureReadClient, OcrEngine};
use crate::output::Analysis;
use crate::pipeline::context::{ChartRequest, PipelineContext};
use crate::pipeline::llm::{AnswerModel, ModelReply};
use crate::pipeline::steps;
use crate::progress::ProgressCallback;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model used when a provider is named but no model is.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Chart question-answering engine.
pub struct ChartInsight<O, M> {
    pub(crate) ocr: O,
    pub(crate) model: M,
    pub(crate) config: InsightConfig,
    pub(crate) progress: Option<ProgressCallback>,
}

impl<O, M> fmt::Debug for ChartInsight<O, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartInsight")
            .field("config", &self.config)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish_non_exhaustive()
    }
}

impl ChartInsight<AzureReadClient, Arc<dyn LLMProvider>> {
    /// Build the production engine: Azure Read for OCR and an
    /// `edgequake-llm` provider resolved from `config`.
    ///
    /// Missing OCR credentials do not fail here; they surface on the first
    /// analysis. A provider that cannot be resolved does fail here.
    pub fn from_config(ocr: OcrConfig, config: InsightConfig) -> Result<Self, InsightError> {
        let ocr = AzureReadClient::new(ocr)?;
        let provider = resolve_provider(&config)?;
        Ok(Self::new(ocr, provider, config))
    }
}

impl<O: OcrEngine, M: AnswerModel> ChartInsight<O, M> {
    pub fn new(ocr: O, model: M, config: InsightConfig) -> Self {
        Self {
            ocr,
            model,
            config,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Answer `question` about a chart whose OCR text is `ocr_text`.
    ///
    /// The answer is returned as the model produced it (trimmed); cosmetic
    /// cleanup is applied by [`analyze::analyze_image`], not here.
    pub async fn run(
        &self,
        ocr_text: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<String, InsightError> {
        Ok(self.run_context(ocr_text, question).await?.answer)
    }

    /// Like [`ChartInsight::run`] but returns the whole pipeline context.
    pub async fn run_context(
        &self,
        ocr_text: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<PipelineContext, InsightError> {
        let (ctx, _) = self
            .run_pipeline(ChartRequest::new(ocr_text, question))
            .await?;
        Ok(ctx)
    }

    /// Decode an image, OCR it, answer the question and clean the answer.
    pub async fn analyze(
        &self,
        image_bytes: &[u8],
        question: &str,
    ) -> Result<Analysis, InsightError> {
        analyze::analyze_image(self, image_bytes, question).await
    }

    /// Answer a question about OCR text supplied by the caller, with the
    /// same cleanup and progress events as [`ChartInsight::analyze`].
    pub async fn analyze_text(
        &self,
        ocr_text: &str,
        question: &str,
    ) -> Result<Analysis, InsightError> {
        analyze::analyze_text(self, ocr_text, question).await
    }

    pub(crate) async fn run_pipeline(
        &self,
        request: ChartRequest,
    ) -> Result<(PipelineContext, Option<ModelReply>), InsightError> {
        let normalized = steps::normalize_question(request);
        let validated = steps::validate_ocr(normalized);
        let classified = steps::classify_chart(validated);
        debug!(
            "Pipeline: chart={} clarification_needed={}",
            classified.chart_type, classified.clarification_needed
        );

        if !classified.clarification_needed {
            if let Some(ref cb) = self.progress {
                cb.on_answer_start(classified.chart_type);
            }
        }

        steps::generate_answer(classified, &self.model, &self.config).await
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_answer_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, InsightError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        InsightError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider + model** (`config.provider_name`) — the factory reads
///    the matching API key (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **OpenAI key present** — prefer OpenAI when several keys are set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &InsightConfig) -> Result<Arc<dyn LLMProvider>, InsightError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_answer_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_answer_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_answer_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| InsightError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    if let Some(model) = ignored_model(config) {
        warn!(
            "Model '{}' ignored: the auto-detected provider uses its own default. \
             Set --provider (or EDGEQUAKE_LLM_PROVIDER) to choose the model.",
            model
        );
    }
    info!("Auto-detected LLM provider");
    Ok(llm_provider)
}

/// The requested model, if auto-detection would drop it.
fn ignored_model(config: &InsightConfig) -> Option<&str> {
    if config.provider.is_some() || config.provider_name.is_some() {
        return None;
    }
    config.model.as_deref().filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_model_is_flagged_when_auto_detecting() {
        let config = InsightConfig::builder().model("gpt-4o").build().unwrap();
        assert_eq!(ignored_model(&config), Some("gpt-4o"));
    }

    #[test]
    fn named_provider_keeps_requested_model() {
        let config = InsightConfig::builder()
            .model("gpt-4o")
            .provider_name("openai")
            .build()
            .unwrap();
        assert_eq!(ignored_model(&config), None);
    }

    #[test]
    fn no_model_requested_is_not_flagged() {
        assert_eq!(ignored_model(&InsightConfig::default()), None);
    }
}
