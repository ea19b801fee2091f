use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::handlers::AppState;

/// Liveness endpoint. The relay holds no state worth probing beyond the
/// configured model name.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "glean",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.gemini.model_name(),
    }))
}
