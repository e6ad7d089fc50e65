use crate::error::PipelineError;
use image::RgbImage;

/// Decode an uploaded image into 8-bit RGB, dropping any alpha channel.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    let _s = common::span_debug!("decode_image");

    let decoded = image::load_from_memory(bytes).map_err(|e| {
        tracing::warn!(error = %e, bytes = bytes.len(), "Image preprocessing error");
        PipelineError::InvalidImageFormat(e)
    })?;

    tracing::trace!(
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "Decoded image"
    );

    Ok(decoded.into_rgb8())
}
