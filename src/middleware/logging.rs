use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

/// Request summary logging with a short request id. Health probes are
/// skipped to keep the log usable.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    let method = request.method().clone();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Request started"
    );

    let response = next.run(request).await;

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
