//! Configuration types for chart question answering.
//!
//! Two structs cover the two external collaborators:
//!
//! * [`InsightConfig`] — which language model to call and how
//!   (provider, model, sampling, per-call timeout, system prompt).
//! * [`OcrConfig`] — where the Azure Read endpoint lives and how long the
//!   client may poll a remote read operation.
//!
//! Both are built through builders with clamped setters and a validating
//! `build()`, so a caller sets only what it cares about and relies on the
//! documented defaults for the rest.

use crate::error::InsightError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the answer-generation step.
///
/// # Example
/// ```rust
/// use chart_insight::InsightConfig;
///
/// let config = InsightConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct InsightConfig {
    /// LLM model identifier, e.g. "gpt-4.1-mini", "claude-sonnet-4-20250514".
    /// If None, uses provider default.
    ///
    /// Only honoured when the provider is named (`provider_name`) or picked
    /// via `OPENAI_API_KEY`; full environment auto-detection chooses its
    /// own model and logs a warning that this one was ignored.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Answers must be read off the chart, not invented, so sampling is
    /// fully greedy unless the caller asks otherwise.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate for one answer. Default: 1024.
    pub max_tokens: usize,

    /// Custom system instruction. If None, uses
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Upper bound on the single LLM round trip, in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 1024,
            system_prompt: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl InsightConfig {
    /// Create a new builder for `InsightConfig`.
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder {
            config: Self::default(),
        }
    }

    /// The system instruction actually sent to the model.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_SYSTEM_PROMPT)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Builder for [`InsightConfig`].
#[derive(Debug)]
pub struct InsightConfigBuilder {
    config: InsightConfig,
}

impl InsightConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
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

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<InsightConfig, InsightError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(InsightError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(InsightError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref p) = c.system_prompt {
            if p.trim().is_empty() {
                return Err(InsightError::InvalidConfig(
                    "system prompt must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── OCR ──────────────────────────────────────────────────────────────────

/// Configuration for the Azure Read OCR client.
///
/// `endpoint` and `api_key` are optional on purpose: a process without OCR
/// credentials still starts, and only an actual OCR call reports
/// [`crate::error::OcrError::NotConfigured`].
#[derive(Clone)]
pub struct OcrConfig {
    /// Resource endpoint, e.g. `https://my-vision.cognitiveservices.azure.com`.
    pub endpoint: Option<String>,

    /// Subscription key sent as `Ocp-Apim-Subscription-Key`.
    pub api_key: Option<String>,

    /// BCP-47 language hint for the read model. Default: "en".
    pub language: String,

    /// Delay between two status polls in milliseconds. Default: 1000.
    pub poll_interval_ms: u64,

    /// Deadline for the whole read operation in seconds. Default: 60.
    ///
    /// A remote status stuck on `running` ends in
    /// [`crate::error::OcrError::Timeout`] instead of blocking forever.
    pub max_wait_secs: u64,

    /// Maximum number of status polls. Default: 120.
    pub max_polls: u32,

    /// Timeout applied to each individual HTTP request in seconds. Default: 30.
    pub request_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            language: "en".to_string(),
            poll_interval_ms: 1000,
            max_wait_secs: 60,
            max_polls: 120,
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_wait_secs", &self.max_wait_secs)
            .field("max_polls", &self.max_polls)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn max_wait_secs(mut self, secs: u64) -> Self {
        self.config.max_wait_secs = secs;
        self
    }

    pub fn max_polls(mut self, n: u32) -> Self {
        self.config.max_polls = n.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, InsightError> {
        let c = &self.config;
        if c.max_wait_secs == 0 {
            return Err(InsightError::InvalidConfig(
                "OCR max wait must be ≥ 1 second".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(InsightError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_defaults() {
        let c = InsightConfig::default();
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.max_tokens, 1024);
        assert_eq!(c.system_prompt(), crate::prompts::DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn temperature_is_clamped() {
        let c = InsightConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = InsightConfig::builder().max_tokens(0).build().unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn blank_system_prompt_rejected() {
        assert!(InsightConfig::builder().system_prompt("   ").build().is_err());
    }

    #[test]
    fn ocr_defaults_are_bounded() {
        let c = OcrConfig::default();
        assert_eq!(c.language, "en");
        assert_eq!(c.poll_interval(), Duration::from_secs(1));
        assert!(c.max_polls > 0);
        assert!(c.max_wait_secs > 0);
    }

    #[test]
    fn ocr_debug_redacts_key() {
        let c = OcrConfig::builder().api_key("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn ocr_zero_wait_rejected() {
        assert!(OcrConfig::builder().max_wait_secs(0).build().is_err());
    }
}
