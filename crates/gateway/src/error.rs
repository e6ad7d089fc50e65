use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inference::PipelineError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API key")]
    Unauthorized,
    #[error("{0}")]
    UnsupportedContentType(&'static str),
    #[error("Invalid image format")]
    InvalidImageFormat(#[source] PipelineError),
    #[error("Maximum {max} images per batch")]
    BatchSizeExceeded { max: usize },
    #[error("{0}")]
    BadRequest(String),
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error("Prediction failed")]
    InferenceFailure(#[source] anyhow::Error),
    #[error("{0}")]
    NotImplemented(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnsupportedContentType(_)
            | ApiError::InvalidImageFormat(_)
            | ApiError::BatchSizeExceeded { .. }
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InferenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            e @ PipelineError::InvalidImageFormat(_) => ApiError::InvalidImageFormat(e),
            PipelineError::ModelUnavailable => ApiError::ModelUnavailable,
            PipelineError::Inference(e) => ApiError::InferenceFailure(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InferenceFailure(e) => {
                tracing::error!(error = ?e, "Prediction error");
            }
            ApiError::InvalidImageFormat(e) => {
                tracing::debug!(error = %e, "Rejected undecodable upload");
            }
            _ => {}
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
