//! Typed pipeline states.
//!
//! The per-request context is not one mutable bag of fields: every step
//! consumes the state produced by the previous step and returns the next
//! one. A field written by an earlier step is moved forward unchanged, so
//! no step can overwrite what it does not own, and the compiler rejects any
//! attempt to run the steps out of order.
//!
//! ```text
//! ChartRequest ─▶ NormalizedRequest ─▶ ValidatedRequest ─▶ ClassifiedRequest ─▶ PipelineContext
//!   (input)        (question trimmed)   (OCR checked)       (chart typed)        (answered)
//! ```

use crate::pipeline::classify::ChartType;
use serde::{Deserialize, Serialize};

/// Raw user input: a question and the OCR text of the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub question: String,
    pub ocr_text: String,
}

impl ChartRequest {
    pub fn new(ocr_text: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ocr_text: ocr_text.into(),
        }
    }
}

/// State after the question has been trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub question: String,
    pub ocr_text: String,
}

/// State after the OCR text has been checked for usable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub question: String,
    pub ocr_text: String,
    pub validated_ocr_text: String,
    pub clarification_needed: bool,
}

/// State after the chart type has been guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRequest {
    pub question: String,
    pub ocr_text: String,
    pub validated_ocr_text: String,
    pub clarification_needed: bool,
    pub chart_type: ChartType,
}

/// Terminal state: every field of the pipeline context, including the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineContext {
    pub question: String,
    pub ocr_text: String,
    pub validated_ocr_text: String,
    pub clarification_needed: bool,
    pub chart_type: ChartType,
    pub answer: String,
}
