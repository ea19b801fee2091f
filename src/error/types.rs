use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorBody;

pub type AppResult<T> = Result<T, AppError>;

/// Message returned to clients for any upstream or parse failure. The
/// distinction between the two is logged server-side only.
const EXTRACTION_FAILED_MESSAGE: &str = "Failed to extract data from AI model.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No image data provided.")]
    MissingImageData,

    #[error("{message}")]
    Upstream { message: String },

    #[error("{message}")]
    Parse { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingImageData => "MISSING_IMAGE_DATA",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::Parse { .. } => "PARSE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingImageData => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        tracing::error!(
            error_code = self.error_code(),
            status_code = %status,
            detail = %detail,
            "Extraction request failed"
        );

        let body = match &self {
            AppError::MissingImageData => ErrorBody {
                message: detail,
                details: None,
            },
            AppError::Upstream { .. } | AppError::Parse { .. } => ErrorBody {
                message: EXTRACTION_FAILED_MESSAGE.to_string(),
                details: Some(detail),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse {
            message: err.to_string(),
        }
    }
}
