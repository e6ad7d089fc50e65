use anyhow::Context;
use common::{Environment, TelemetryGuard, env_non_empty, setup_logging};
use gateway::{AppState, GatewayConfig, build_router};
use inference::{ClassMappingTable, InferenceService, ModelHandle};
use std::sync::Arc;

const SERVICE_NAME: &str = "hazard-gateway";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Installed before the rest of the config is read so malformed values get logged
    let _telemetry = init_observability(
        Environment::from_env(),
        env_non_empty("OTEL_EXPORTER_OTLP_ENDPOINT").as_deref(),
    )?;

    let config = GatewayConfig::from_env();

    tracing::info!(
        environment = config.environment.as_str(),
        auth = config.api_key.is_some(),
        "Starting hazard detection service"
    );

    let model_config = config.model.clone();
    let model = tokio::task::spawn_blocking(move || ModelHandle::load(&model_config))
        .await
        .context("model loading task panicked")?
        .context("failed to load detection model")?;

    let service = InferenceService::new(
        Some(Arc::new(model)),
        Arc::new(ClassMappingTable::standard()),
    );
    let state = AppState::new(service, config.api_key.clone(), config.max_upload_bytes);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(%address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_observability(
    environment: Environment,
    otel_endpoint: Option<&str>,
) -> anyhow::Result<Option<TelemetryGuard>> {
    match otel_endpoint {
        Some(endpoint) => Ok(Some(TelemetryGuard::init(SERVICE_NAME, endpoint, environment)?)),
        None => {
            setup_logging(environment);
            Ok(None)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
