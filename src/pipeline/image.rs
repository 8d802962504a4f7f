//! Image handling: uploaded bytes → RGB image → PNG bytes for OCR.
//!
//! Uploads arrive as PNG or JPEG in any colour mode (palette, RGBA,
//! greyscale). They are normalised to 8-bit RGB and re-encoded as PNG, which
//! is lossless, so JPEG artefacts are not compounded before the OCR service
//! reads the chart labels.

use crate::error::InsightError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode an uploaded image and normalise it to 8-bit RGB.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, InsightError> {
    if bytes.is_empty() {
        return Err(InsightError::ImageDecode {
            detail: "empty upload".to_string(),
        });
    }
    let img = image::load_from_memory(bytes).map_err(|e| InsightError::ImageDecode {
        detail: e.to_string(),
    })?;
    debug!("Decoded {}x{} image", img.width(), img.height());
    Ok(DynamicImage::ImageRgb8(img.into_rgb8()))
}

/// Encode an image as PNG bytes for the OCR request body.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, InsightError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| InsightError::Internal(format!("PNG encoding failed: {e}")))?;
    debug!("Encoded image → {} bytes PNG", buf.len());
    Ok(buf)
}
