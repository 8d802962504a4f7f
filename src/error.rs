//! Error types for the chart-insight library.
//!
//! Two error types reflect the two layers that can fail:
//!
//! * [`OcrError`] — the OCR service could not turn the image into text
//!   (not configured, HTTP failure, remote operation failed, poll deadline
//!   reached, or simply no text on the chart).
//!
//! * [`InsightError`] — the tagged error returned by the top-level entry
//!   points. Its three request-level variants map one-to-one onto the
//!   failure classes of the `/analyze` contract: the image could not be
//!   decoded, OCR failed, or answer generation failed.
//!
//! The `Display` strings are the exact messages placed in the
//! `{"error": ...}` payload, so callers that only need the JSON shape never
//! have to format anything themselves, while callers that need to branch use
//! [`InsightError::kind`] instead of parsing text.

use thiserror::Error;

/// Message used whenever OCR yields nothing usable.
pub const OCR_NO_TEXT_MESSAGE: &str = "OCR failed or no text found.";

/// All errors returned by the chart-insight library.
#[derive(Debug, Error)]
pub enum InsightError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The uploaded bytes are not a decodable PNG/JPEG image.
    #[error("Error loading image: {detail}")]
    ImageDecode { detail: String },

    /// Text extraction failed or found no text.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The language model call failed or timed out.
    #[error("Pipeline error: {message}")]
    Generation { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    /// Stable, machine-readable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            InsightError::ImageDecode { .. } => "image_decode",
            InsightError::Ocr(_) => "ocr",
            InsightError::Generation { .. } => "generation",
            InsightError::ProviderNotConfigured { .. } | InsightError::InvalidConfig(_) => {
                "config"
            }
            InsightError::Internal(_) => "internal",
        }
    }
}

/// Failures of the OCR client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OcrError {
    /// Endpoint or key missing; reported on first use, never at startup.
    #[error("Azure OCR Error: OCR service is not configured ({missing} is missing)")]
    NotConfigured { missing: &'static str },

    /// Transport-level failure talking to the OCR service.
    #[error("Azure OCR Error: {detail}")]
    Request { detail: String },

    /// The OCR service answered with a non-success HTTP status.
    #[error("Azure OCR Error: HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The submit call succeeded but did not say where to poll.
    #[error("Azure OCR Error: response has no Operation-Location header")]
    MissingOperationLocation,

    /// The status payload could not be parsed.
    #[error("Azure OCR Error: invalid response: {detail}")]
    InvalidResponse { detail: String },

    /// The remote read operation ended in a non-success terminal status.
    #[error("OCR failed or no text found.")]
    OperationFailed { status: String },

    /// The read succeeded but the image contains no text lines.
    #[error("OCR failed or no text found.")]
    NoText,

    /// Polling hit the deadline or the poll budget before a terminal status.
    #[error("Azure OCR Error: read operation still '{last_status}' after {polls} polls ({elapsed_ms}ms)")]
    Timeout {
        polls: u32,
        elapsed_ms: u64,
        last_status: String,
    },
}
