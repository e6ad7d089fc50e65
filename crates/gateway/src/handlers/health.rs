//! Liveness and readiness check. Always public.

use crate::state::AppState;
use axum::{Json, extract::State};
use inference::Device;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub device: Device,
    pub timestamp: String,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.service.model();

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "unhealthy" },
        model_loaded: model.is_some(),
        device: model.map(|m| m.device()).unwrap_or(Device::Cpu),
        timestamp: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    })
}
