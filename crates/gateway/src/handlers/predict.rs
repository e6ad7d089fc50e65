use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    upload::{UploadedFile, read_file, read_files},
};
use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::QueryRejection,
    },
};
use inference::{HazardPrediction, ImageSize, InferenceResult, InferenceService};
use serde::{Deserialize, Serialize};

pub const MAX_BATCH_SIZE: usize = 10;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
const DEFAULT_FRAME_INTERVAL: u32 = 30;

const IMAGE_REQUIRED: &str = "File must be an image";
const VIDEO_REQUIRED: &str = "File must be a video";
const VIDEO_UNSUPPORTED: &str = "Video processing not fully implemented";

fn default_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_frame_interval() -> u32 {
    DEFAULT_FRAME_INTERVAL
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f32,
}

#[derive(Debug, Deserialize)]
pub struct VideoParams {
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f32,
    /// Process every Nth frame.
    #[serde(default = "default_frame_interval")]
    pub frame_interval: u32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Success {
        file_index: usize,
        filename: Option<String>,
        predictions: Vec<HazardPrediction>,
        processing_time: f64,
        image_size: ImageSize,
    },
    Failure {
        file_index: usize,
        filename: Option<String>,
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

fn ensure_ready(state: &AppState) -> ApiResult<()> {
    if state.service.is_ready() {
        Ok(())
    } else {
        Err(ApiError::ModelUnavailable)
    }
}

fn confidence_threshold(params: Result<Query<PredictParams>, QueryRejection>) -> ApiResult<f32> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !params.confidence_threshold.is_finite() {
        return Err(ApiError::BadRequest(
            "confidence_threshold must be a finite number".into(),
        ));
    }
    Ok(params.confidence_threshold)
}

/// Model calls are CPU/GPU-bound; keep them off the async workers.
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InferenceFailure(anyhow::Error::new(e)))
}

#[tracing::instrument(name = "predict_single", skip_all)]
pub async fn single(
    State(state): State<AppState>,
    params: Result<Query<PredictParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<InferenceResult>> {
    ensure_ready(&state)?;
    let threshold = confidence_threshold(params)?;

    let file = read_file(multipart, "file").await?;
    if !file.is_image() {
        return Err(ApiError::UnsupportedContentType(IMAGE_REQUIRED));
    }

    let service = state.service.clone();
    let result = run_blocking(move || service.predict(&file.bytes, threshold)).await??;

    tracing::info!(
        predictions = result.predictions.len(),
        processing_time = result.processing_time,
        "Prediction complete"
    );

    Ok(Json(result))
}

#[tracing::instrument(name = "predict_batch", skip_all)]
pub async fn batch(
    State(state): State<AppState>,
    params: Result<Query<PredictParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<BatchResponse>> {
    ensure_ready(&state)?;
    let threshold = confidence_threshold(params)?;

    let files = read_files(multipart, "files").await?;
    if files.is_empty() {
        return Err(ApiError::BadRequest("Missing multipart field `files`".into()));
    }
    if files.len() > MAX_BATCH_SIZE {
        return Err(ApiError::BatchSizeExceeded {
            max: MAX_BATCH_SIZE,
        });
    }

    let service = state.service.clone();
    let results = run_blocking(move || predict_batch(&service, &files, threshold)).await?;

    tracing::info!(entries = results.len(), "Batch prediction complete");

    Ok(Json(BatchResponse { results }))
}

/// One entry per image part, tagged with its position in the upload.
/// Non-image parts produce no entry; a failing image does not stop the rest.
pub fn predict_batch(
    service: &InferenceService,
    files: &[UploadedFile],
    confidence_threshold: f32,
) -> Vec<BatchEntry> {
    files
        .iter()
        .enumerate()
        .filter(|(file_index, file)| {
            if !file.is_image() {
                tracing::debug!(file_index, content_type = file.content_type.as_deref(), "Skipping non-image file");
            }
            file.is_image()
        })
        .map(|(file_index, file)| {
            let filename = file.filename.clone();
            match service.predict(&file.bytes, confidence_threshold) {
                Ok(result) => BatchEntry::Success {
                    file_index,
                    filename,
                    predictions: result.predictions,
                    processing_time: result.processing_time,
                    image_size: result.image_size,
                },
                Err(e) => {
                    tracing::error!(file_index, error = %e, "Batch prediction error");
                    BatchEntry::Failure {
                        file_index,
                        filename,
                        error: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

#[tracing::instrument(name = "predict_video", skip_all)]
pub async fn video(
    State(state): State<AppState>,
    params: Result<Query<VideoParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<()> {
    ensure_ready(&state)?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let file = read_file(multipart, "file").await?;
    if !file.is_video() {
        return Err(ApiError::UnsupportedContentType(VIDEO_REQUIRED));
    }

    tracing::debug!(
        confidence_threshold = params.confidence_threshold,
        frame_interval = params.frame_interval,
        bytes = file.bytes.len(),
        "Video upload received"
    );

    Err(ApiError::NotImplemented(VIDEO_UNSUPPORTED))
}
