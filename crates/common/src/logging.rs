use crate::config::Environment;
use opentelemetry::global::BoxedTracer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug";

/// Initialize tracing subscriber with pretty formatting for development
/// and JSON formatting for production.
///
/// Uses RUST_LOG environment variable for filtering (defaults to
/// "info,tower_http=debug" if not set).
pub fn setup_logging(environment: Environment) {
    init_subscriber(environment, None);
}

/// Installs the global subscriber. When `tracer` is provided, spans are also
/// bridged to OpenTelemetry.
pub(crate) fn init_subscriber(environment: Environment, tracer: Option<BoxedTracer>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_DIRECTIVES.into());

    let otel_layer = tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t));

    let (json_layer, pretty_layer) = match environment {
        Environment::Production => (
            Some(tracing_subscriber::fmt::layer().json().with_level(true)),
            None,
        ),
        Environment::Development => (
            None,
            Some(tracing_subscriber::fmt::layer().pretty().with_ansi(true)),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}
