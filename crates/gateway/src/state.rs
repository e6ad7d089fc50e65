use crate::auth::ApiKey;
use inference::InferenceService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: InferenceService,
    pub api_key: Option<Arc<ApiKey>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: InferenceService, api_key: Option<ApiKey>, max_upload_bytes: usize) -> Self {
        Self {
            service,
            api_key: api_key.map(Arc::new),
            max_upload_bytes,
        }
    }
}
