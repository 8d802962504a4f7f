//! The four pipeline steps.
//!
//! Steps 1–3 are pure functions. Step 4 is the only one that may suspend,
//! and only when the OCR text was usable; otherwise it answers with
//! [`CLARIFICATION_MESSAGE`] without contacting the model.

use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::pipeline::classify::classify_chart_text;
use crate::pipeline::context::{
    ChartRequest, ClassifiedRequest, NormalizedRequest, PipelineContext, ValidatedRequest,
};
use crate::pipeline::llm::{self, AnswerModel, ModelReply};
use crate::prompts::{chart_question_prompt, CLARIFICATION_MESSAGE, OCR_PLACEHOLDER};
use tracing::debug;

/// Step 1: trim surrounding whitespace from the question.
///
/// An empty question is passed through as a legitimate question.
pub fn normalize_question(req: ChartRequest) -> NormalizedRequest {
    NormalizedRequest {
        question: req.question.trim().to_string(),
        ocr_text: req.ocr_text,
    }
}

/// Step 2: decide whether the OCR text is usable.
pub fn validate_ocr(req: NormalizedRequest) -> ValidatedRequest {
    let (validated_ocr_text, clarification_needed) = if req.ocr_text.trim().is_empty() {
        (OCR_PLACEHOLDER.to_string(), true)
    } else {
        (req.ocr_text.clone(), false)
    };
    ValidatedRequest {
        question: req.question,
        ocr_text: req.ocr_text,
        validated_ocr_text,
        clarification_needed,
    }
}

/// Step 3: classify the chart from the raw OCR text.
pub fn classify_chart(req: ValidatedRequest) -> ClassifiedRequest {
    let chart_type = classify_chart_text(&req.ocr_text);
    debug!("Classified chart as {}", chart_type);
    ClassifiedRequest {
        question: req.question,
        ocr_text: req.ocr_text,
        validated_ocr_text: req.validated_ocr_text,
        clarification_needed: req.clarification_needed,
        chart_type,
    }
}

/// Step 4: produce the answer.
///
/// Returns the finished context plus the model reply when the model was
/// called (`None` when clarification was needed).
pub async fn generate_answer<M: AnswerModel>(
    req: ClassifiedRequest,
    model: &M,
    config: &InsightConfig,
) -> Result<(PipelineContext, Option<ModelReply>), InsightError> {
    let (answer, reply) = if req.clarification_needed {
        debug!("OCR text unusable; skipping LLM");
        (CLARIFICATION_MESSAGE.to_string(), None)
    } else {
        let prompt = chart_question_prompt(&req.validated_ocr_text, &req.question, req.chart_type);
        let reply = llm::ask(model, prompt, config).await?;
        (reply.content.trim().to_string(), Some(reply))
    };

    Ok((
        PipelineContext {
            question: req.question,
            ocr_text: req.ocr_text,
            validated_ocr_text: req.validated_ocr_text,
            clarification_needed: req.clarification_needed,
            chart_type: req.chart_type,
            answer,
        },
        reply,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::ChartType;
    use edgequake_llm::{ChatMessage, CompletionOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    impl AnswerModel for Echo {
        async fn answer(
            &self,
            messages: Vec<ChatMessage>,
            _options: CompletionOptions,
        ) -> Result<ModelReply, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ModelReply::text(format!("  {} messages  ", messages.len())))
        }
    }

    fn classified(ocr: &str, question: &str) -> ClassifiedRequest {
        classify_chart(validate_ocr(normalize_question(ChartRequest::new(ocr, question))))
    }

    #[test]
    fn normalize_trims() {
        let n = normalize_question(ChartRequest::new("x", "  Which is higher?\n"));
        assert_eq!(n.question, "Which is higher?");
        assert_eq!(n.ocr_text, "x");
    }

    #[test]
    fn normalize_keeps_empty_question() {
        let n = normalize_question(ChartRequest::new("x", "   "));
        assert_eq!(n.question, "");
    }

    #[test]
    fn validate_whitespace_ocr_needs_clarification() {
        for ocr in ["", "   ", "\n\t "] {
            let v = validate_ocr(normalize_question(ChartRequest::new(ocr, "q")));
            assert!(v.clarification_needed, "ocr {ocr:?}");
            assert_eq!(v.validated_ocr_text, OCR_PLACEHOLDER);
            assert_eq!(v.ocr_text, ocr);
        }
    }

    #[test]
    fn validate_copies_usable_ocr_unchanged() {
        let v = validate_ocr(normalize_question(ChartRequest::new("  Q1 100  ", "q")));
        assert!(!v.clarification_needed);
        assert_eq!(v.validated_ocr_text, "  Q1 100  ");
    }

    #[test]
    fn classify_uses_raw_ocr() {
        assert_eq!(classified("Pie: share", "q").chart_type, ChartType::Pie);
        assert_eq!(classified("", "q").chart_type, ChartType::Line);
    }

    #[test]
    fn clarification_skips_model() {
        let model = Echo {
            calls: AtomicUsize::new(0),
        };
        let config = InsightConfig::default();
        let (ctx, reply) =
            tokio_test::block_on(generate_answer(classified("", "q"), &model, &config)).unwrap();
        assert_eq!(ctx.answer, CLARIFICATION_MESSAGE);
        assert!(reply.is_none());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn answer_is_trimmed_model_reply() {
        let model = Echo {
            calls: AtomicUsize::new(0),
        };
        let config = InsightConfig::default();
        let (ctx, reply) = generate_answer(classified("Bar: 1 2", "q"), &model, &config)
            .await
            .unwrap();
        assert_eq!(ctx.answer, "2 messages");
        assert!(reply.is_some());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.chart_type, ChartType::Bar);
    }
}
