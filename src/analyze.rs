//! Image-to-answer entry point: the `/analyze` contract as a function.
//!
//! ```text
//! bytes ─decode─▶ RGB image ─PNG─▶ OCR ─▶ pipeline ─▶ clean_answer ─▶ Analysis
//!   │                              │          │
//!   └ ImageDecode                  └ Ocr      └ Generation
//! ```
//!
//! Each failure short-circuits: an undecodable upload never reaches OCR, and
//! an OCR failure (including "no text") never reaches the pipeline. Wrap the
//! result in [`AnalyzeResponse`] to get the uniform JSON payload.

use crate::engine::ChartInsight;
use crate::error::InsightError;
use crate::ocr::OcrEngine;
use crate::output::{Analysis, AnalysisStats, AnalyzeResponse};
use crate::pipeline::context::ChartRequest;
use crate::pipeline::image::{decode_image, encode_png};
use crate::pipeline::llm::AnswerModel;
use crate::pipeline::postprocess::clean_answer;
use std::time::Instant;
use tracing::{info, warn};

/// Analyse a chart image and answer `question` about it.
pub async fn analyze_image<O: OcrEngine, M: AnswerModel>(
    engine: &ChartInsight<O, M>,
    image_bytes: &[u8],
    question: &str,
) -> Result<Analysis, InsightError> {
    let result = run_analysis(engine, image_bytes, question).await;
    finish(engine, result)
}

/// Answer `question` about OCR text the caller already has.
///
/// Skips decoding and OCR; the answer is cleaned and the completion or
/// error event fires exactly as for [`analyze_image`].
pub async fn analyze_text<O: OcrEngine, M: AnswerModel>(
    engine: &ChartInsight<O, M>,
    ocr_text: &str,
    question: &str,
) -> Result<Analysis, InsightError> {
    let total_start = Instant::now();
    let result = answer_text(engine, ocr_text.to_string(), question, 0, total_start).await;
    finish(engine, result)
}

fn finish<O, M>(
    engine: &ChartInsight<O, M>,
    result: Result<Analysis, InsightError>,
) -> Result<Analysis, InsightError> {
    if let Some(ref cb) = engine.progress {
        match &result {
            Ok(a) => cb.on_analysis_complete(a.answer.len()),
            Err(e) => cb.on_analysis_error(e.kind(), &e.to_string()),
        }
    }
    if let Err(ref e) = result {
        warn!("Analysis failed ({}): {}", e.kind(), e);
    }
    result
}

/// Analyse a chart image and render the outcome as the JSON payload.
pub async fn analyze_response<O: OcrEngine, M: AnswerModel>(
    engine: &ChartInsight<O, M>,
    image_bytes: &[u8],
    question: &str,
) -> AnalyzeResponse {
    analyze_image(engine, image_bytes, question).await.into()
}

async fn run_analysis<O: OcrEngine, M: AnswerModel>(
    engine: &ChartInsight<O, M>,
    image_bytes: &[u8],
    question: &str,
) -> Result<Analysis, InsightError> {
    let total_start = Instant::now();

    // ── Step 1: Decode upload ────────────────────────────────────────────
    let image = decode_image(image_bytes)?;
    let png = encode_png(&image)?;

    // ── Step 2: OCR ──────────────────────────────────────────────────────
    if let Some(ref cb) = engine.progress {
        cb.on_ocr_start(png.len());
    }
    let ocr_start = Instant::now();
    let ocr_text = engine.ocr.extract_text(png).await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;
    if let Some(ref cb) = engine.progress {
        cb.on_ocr_complete(ocr_text.len());
    }

    answer_text(engine, ocr_text, question, ocr_duration_ms, total_start).await
}

async fn answer_text<O: OcrEngine, M: AnswerModel>(
    engine: &ChartInsight<O, M>,
    ocr_text: String,
    question: &str,
    ocr_duration_ms: u64,
    total_start: Instant,
) -> Result<Analysis, InsightError> {
    // ── Step 3: Pipeline ─────────────────────────────────────────────────
    let llm_start = Instant::now();
    let (ctx, reply) = engine
        .run_pipeline(ChartRequest::new(ocr_text, question))
        .await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 4: Cleanup ──────────────────────────────────────────────────
    let answer = clean_answer(&ctx.answer);

    let stats = AnalysisStats {
        ocr_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        input_tokens: reply.as_ref().map_or(0, |r| r.input_tokens),
        output_tokens: reply.as_ref().map_or(0, |r| r.output_tokens),
    };

    info!(
        "Analysis complete: {} in {}ms ({} tokens in / {} out)",
        ctx.chart_type, stats.total_duration_ms, stats.input_tokens, stats.output_tokens
    );

    Ok(Analysis {
        ocr_text: ctx.ocr_text,
        answer,
        chart_type: ctx.chart_type,
        clarification_needed: ctx.clarification_needed,
        stats,
    })
}
