//! Result types returned by an analysis.

use crate::error::InsightError;
use crate::pipeline::classify::ChartType;
use serde::{Deserialize, Serialize};

/// Everything one successful analysis produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Text returned by the OCR service, unchanged.
    pub ocr_text: String,

    /// The answer after [`crate::pipeline::postprocess::clean_answer`].
    pub answer: String,

    pub chart_type: ChartType,

    /// True when the pipeline answered with the clarification message
    /// without calling the model.
    pub clarification_needed: bool,

    pub stats: AnalysisStats,
}

/// Timing and token accounting for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub ocr_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// JSON payload of the `/analyze` contract.
///
/// Success and failure share no keys, so the untagged representation is
/// unambiguous in both directions:
///
/// ```json
/// {"ocr_extracted_text": "...", "llm_answer": "..."}
/// {"error": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Success {
        ocr_extracted_text: String,
        llm_answer: String,
    },
    Error {
        error: String,
    },
}

impl AnalyzeResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalyzeResponse::Error { .. })
    }
}

impl From<Analysis> for AnalyzeResponse {
    fn from(a: Analysis) -> Self {
        AnalyzeResponse::Success {
            ocr_extracted_text: a.ocr_text,
            llm_answer: a.answer,
        }
    }
}

impl From<InsightError> for AnalyzeResponse {
    fn from(e: InsightError) -> Self {
        AnalyzeResponse::Error {
            error: e.to_string(),
        }
    }
}

impl From<Result<Analysis, InsightError>> for AnalyzeResponse {
    fn from(r: Result<Analysis, InsightError>) -> Self {
        match r {
            Ok(a) => a.into(),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use serde_json::json;

    #[test]
    fn success_shape() {
        let r = AnalyzeResponse::Success {
            ocr_extracted_text: "Q1 100".into(),
            llm_answer: "Q1".into(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"ocr_extracted_text": "Q1 100", "llm_answer": "Q1"})
        );
    }

    #[test]
    fn error_shapes_are_uniform() {
        let errors = [
            InsightError::ImageDecode {
                detail: "bad".into(),
            },
            InsightError::Ocr(OcrError::NoText),
            InsightError::Generation {
                message: "boom".into(),
            },
        ];
        let expected = [
            "Error loading image: bad",
            "OCR failed or no text found.",
            "Pipeline error: boom",
        ];
        for (e, msg) in errors.into_iter().zip(expected) {
            let r = AnalyzeResponse::from(e);
            assert!(r.is_error());
            assert_eq!(serde_json::to_value(&r).unwrap(), json!({ "error": msg }));
        }
    }

    #[test]
    fn deserializes_both_shapes() {
        let ok: AnalyzeResponse =
            serde_json::from_str(r#"{"ocr_extracted_text":"a","llm_answer":"b"}"#).unwrap();
        assert!(!ok.is_error());
        let err: AnalyzeResponse = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert!(err.is_error());
    }
}
