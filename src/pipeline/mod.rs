//! Pipeline stages for chart question answering.
//!
//! Each submodule implements exactly one concern, so every stage can be
//! tested without the network.
//!
//! ## Data Flow
//!
//! ```text
//! image ──▶ (OCR) ──▶ normalize ──▶ validate ──▶ classify ──▶ generate ──▶ postprocess
//! (bytes)   (text)    (question)    (OCR text)   (chart type)  (LLM)        (cleanup)
//! ```
//!
//! 1. [`image`]    — decode the upload and PNG-encode it for the OCR service
//! 2. [`steps`]    — the four sequential steps over the typed [`context`]
//!    states
//! 3. [`classify`] — keyword heuristic behind step 3
//! 4. [`llm`]      — the model seam used by step 4; the only stage with
//!    network I/O besides OCR
//! 5. [`postprocess`] — deterministic regex cleanup of the answer text

pub mod classify;
pub mod context;
pub mod image;
pub mod llm;
pub mod postprocess;
pub mod steps;
