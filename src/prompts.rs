//! Prompts and fixed messages for chart question answering.
//!
//! Every user-visible constant of the pipeline lives here so tests can
//! assert on the exact text without a model in the loop.
//!
//! Callers can override the system instruction via
//! [`crate::config::InsightConfig::system_prompt`]; [`DEFAULT_SYSTEM_PROMPT`]
//! is used only when no override is provided.

use crate::pipeline::classify::ChartType;

/// Default system instruction: answer strictly from the extracted chart data.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a financial analyst AI. Answer questions using only the extracted chart data.";

/// Answer returned instead of calling the model when OCR text is unusable.
pub const CLARIFICATION_MESSAGE: &str = "Please clarify your question or check the OCR text.";

/// Validated OCR text substituted when the raw OCR text is empty.
pub const OCR_PLACEHOLDER: &str = "OCR failed or no text found.";

/// Build the user message sent alongside the system instruction.
///
/// The chart text is fenced between two rule lines so the model can tell
/// where the extracted data ends and the question begins.
pub fn chart_question_prompt(chart_text: &str, question: &str, chart_type: ChartType) -> String {
    format!(
        "--- Chart Text ---\n{}\n------------------\nQuestion: {}\nChart Type: {}",
        chart_text, question, chart_type
    )
}
