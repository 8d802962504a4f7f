//! Optical character recognition: chart image → plain text.
//!
//! [`OcrEngine`] is the seam the rest of the crate depends on. The only
//! production implementation is [`azure::AzureReadClient`], which drives the
//! asynchronous Azure Read API; tests substitute fixed-text engines.

pub mod azure;

pub use azure::AzureReadClient;

use crate::error::OcrError;
use std::future::Future;

/// Anything that can read the text printed on an image.
///
/// `png` is a losslessly encoded PNG. Implementations return every text
/// line joined with `\n`, or [`OcrError::NoText`] when the image carries no
/// readable text.
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, png: Vec<u8>) -> impl Future<Output = Result<String, OcrError>> + Send;
}
