use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{Json, extract::State};
use inference::Device;
use serde::Serialize;

pub const MODEL_NAME: &str = "YOLOv8";
pub const MODEL_RELEASE: &str = "8.0.196";

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_name: &'static str,
    pub model_version: &'static str,
    pub device: Device,
    pub classes: Vec<String>,
    /// `[height, width]` of the model input.
    pub input_size: [u32; 2],
    pub source: &'static str,
}

pub async fn model_info(State(state): State<AppState>) -> ApiResult<Json<ModelInfo>> {
    let model = state.service.model().ok_or(ApiError::ModelUnavailable)?;
    let (width, height) = model.input_size();

    Ok(Json(ModelInfo {
        model_name: MODEL_NAME,
        model_version: MODEL_RELEASE,
        device: model.device(),
        classes: model.class_names().as_slice().to_vec(),
        input_size: [height, width],
        source: model.source().as_str(),
    }))
}
