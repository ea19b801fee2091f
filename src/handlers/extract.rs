use axum::{extract::State, response::Json};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::models::ExtractRequest;

/// `POST /api/extract` — relay one page image to the model and return its
/// parsed JSON reply verbatim.
pub async fn extract_handler(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> AppResult<Json<Value>> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(
        request_id = %request_id,
        image_chars = req.image_data.len(),
        "Starting extraction request"
    );

    if req.image_data.is_empty() {
        warn!(request_id = %request_id, "Request carried no image data");
        return Err(AppError::MissingImageData);
    }

    let data = state.gemini.extract_products(&req.image_data).await?;

    info!(
        request_id = %request_id,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Extraction completed"
    );

    Ok(Json(data))
}
