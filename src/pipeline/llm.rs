//! Language-model interaction: build chat messages and call the provider.
//!
//! The pipeline talks to the model through the small [`AnswerModel`] seam
//! rather than through `edgequake_llm::LLMProvider` directly. Production code
//! uses the blanket implementation for `Arc<dyn LLMProvider>`; tests plug in
//! a fake that records prompts and never touches the network.
//!
//! There is deliberately no retry loop here: one question is one round
//! trip, and a failed call surfaces as [`InsightError::Generation`]. The
//! call is bounded by [`InsightConfig::api_timeout_secs`].

use crate::config::InsightConfig;
use crate::error::InsightError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Text and token accounting for one model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ModelReply {
    /// Reply with no token accounting; handy for fakes and cached answers.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Anything that can answer a system + user chat exchange.
pub trait AnswerModel: Send + Sync {
    fn answer(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> impl Future<Output = Result<ModelReply, InsightError>> + Send;
}

impl AnswerModel for Arc<dyn LLMProvider> {
    fn answer(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> impl Future<Output = Result<ModelReply, InsightError>> + Send {
        let provider = Arc::clone(self);
        async move {
            let response = provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| InsightError::Generation {
                    message: e.to_string(),
                })?;
            Ok(ModelReply {
                content: response.content,
                input_tokens: response.prompt_tokens as u64,
                output_tokens: response.completion_tokens as u64,
            })
        }
    }
}

/// Send one chart question to the model.
///
/// ## Message Layout
///
/// 1. **System message** — the answer-only-from-chart-data instruction (or
///    the user-supplied override)
/// 2. **User message** — the chart text, question and chart type built by
///    [`crate::prompts::chart_question_prompt`]
pub async fn ask<M: AnswerModel>(
    model: &M,
    user_prompt: String,
    config: &InsightConfig,
) -> Result<ModelReply, InsightError> {
    let start = Instant::now();
    let messages = vec![
        ChatMessage::system(config.system_prompt()),
        ChatMessage::user(user_prompt),
    ];
    let options = build_options(config);

    let reply = tokio::time::timeout(config.api_timeout(), model.answer(messages, options))
        .await
        .map_err(|_| {
            warn!("LLM call timed out after {}s", config.api_timeout_secs);
            InsightError::Generation {
                message: format!("LLM call timed out after {}s", config.api_timeout_secs),
            }
        })??;

    debug!(
        "LLM reply: {} input tokens, {} output tokens, {:?}",
        reply.input_tokens,
        reply.output_tokens,
        start.elapsed()
    );
    Ok(reply)
}

/// Build `CompletionOptions` from the insight config.
fn build_options(config: &InsightConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
