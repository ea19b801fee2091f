pub mod extract;
pub mod health;

pub use extract::*;
pub use health::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::logging_middleware;
use crate::services::GeminiClient;

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
}

/// Build the relay application. Shared by the server binary and the
/// integration tests, which inject a config pointing at a mock upstream.
pub fn app(config: Config) -> Router {
    let state = AppState {
        gemini: Arc::new(GeminiClient::new(&config)),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/extract", post(extract_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(config.max_image_size_mb * 1024 * 1024))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
        .with_state(state)
}
