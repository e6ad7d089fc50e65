use thiserror::Error;

/// Failures of the single-image pipeline, one variant per stage that can fail.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(#[from] image::ImageError),

    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Inference failed: {0}")]
    Inference(#[source] anyhow::Error),
}

impl PipelineError {
    /// Short, stable name used for logs and metric attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidImageFormat(_) => "invalid_image_format",
            PipelineError::ModelUnavailable => "model_unavailable",
            PipelineError::Inference(_) => "inference_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = PipelineError::ModelUnavailable;
        assert_eq!(err.to_string(), "Model not loaded");

        let err = PipelineError::Inference(anyhow::anyhow!("session exploded"));
        assert_eq!(err.to_string(), "Inference failed: session exploded");
        assert_eq!(err.kind(), "inference_failure");
    }

    #[test]
    fn test_error_conversion_from_image_error() {
        let image_err = image::load_from_memory(b"definitely not an image").unwrap_err();
        let err: PipelineError = image_err.into();

        assert!(matches!(err, PipelineError::InvalidImageFormat(_)));
        assert_eq!(err.kind(), "invalid_image_format");
    }
}
