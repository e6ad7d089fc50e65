pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
