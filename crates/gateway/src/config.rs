use crate::auth::ApiKey;
use common::{Environment, env_non_empty, env_or};
use inference::ModelConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Bearer secret; `None` disables authentication.
    pub api_key: Option<ApiKey>,
    pub max_upload_bytes: usize,
    pub otel_endpoint: Option<String>,
    pub environment: Environment,
    pub model: ModelConfig,
}

impl GatewayConfig {
    /// Read the gateway configuration once at startup.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", DEFAULT_PORT),
            api_key: env_non_empty("ML_API_KEY").map(ApiKey::new),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            otel_endpoint: env_non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            environment: Environment::from_env(),
            model: ModelConfig::from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
