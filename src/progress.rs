//! Progress-callback trait for analysis stage events.
//!
//! Attach an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::engine::ChartInsight::with_progress`] to be told when each stage
//! of an analysis starts and finishes. The CLI uses it to drive a spinner;
//! a server could forward the same events to a log or a websocket.
//!
//! # Example
//!
//! ```rust
//! use chart_insight::{AnalysisProgressCallback, ChartType};
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! struct Watcher {
//!     asked_model: AtomicBool,
//! }
//!
//! impl AnalysisProgressCallback for Watcher {
//!     fn on_answer_start(&self, chart_type: ChartType) {
//!         self.asked_model.store(true, Ordering::SeqCst);
//!         eprintln!("asking the model about a {chart_type}");
//!     }
//! }
//! ```

use crate::pipeline::classify::ChartType;
use std::sync::Arc;

/// Called by [`crate::engine::ChartInsight`] as an analysis advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// engine may be shared between tasks.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once the image is decoded and about to be sent to OCR.
    ///
    /// # Arguments
    /// * `png_len` — byte length of the PNG sent to the OCR service
    fn on_ocr_start(&self, png_len: usize) {
        let _ = png_len;
    }

    /// Called when OCR returned text.
    ///
    /// # Arguments
    /// * `text_len` — byte length of the extracted text
    fn on_ocr_complete(&self, text_len: usize) {
        let _ = text_len;
    }

    /// Called just before the language model is asked. Not called when the
    /// pipeline answers with the clarification message instead.
    fn on_answer_start(&self, chart_type: ChartType) {
        let _ = chart_type;
    }

    /// Called when an analysis produced an answer.
    ///
    /// # Arguments
    /// * `answer_len` — byte length of the cleaned answer
    fn on_analysis_complete(&self, answer_len: usize) {
        let _ = answer_len;
    }

    /// Called when an analysis failed.
    ///
    /// # Arguments
    /// * `kind`  — [`crate::error::InsightError::kind`] of the failure
    /// * `error` — human-readable error description
    fn on_analysis_error(&self, kind: &str, error: &str) {
        let _ = (kind, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::engine::ChartInsight`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
