//! HTTP client for the extraction relay.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{ErrorBody, ExtractRequest};

#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay answered with an error body; `message` is what it said.
    #[error("{message}")]
    Server { message: String },

    /// Transport failure before any relay reply.
    #[error("An unexpected error occurred on the server.")]
    Network { detail: String },
}

pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST one base64 PNG to the relay and return the extracted JSON.
    ///
    /// On a non-2xx reply the server's `message` field becomes the error;
    /// anything else degrades to the generic message.
    pub async fn extract(&self, image_base64: &str) -> Result<Value, RelayError> {
        let url = format!("{}/api/extract", self.base_url);

        debug!(url = %url, image_chars = image_base64.len(), "Posting page image to relay");

        let response = self
            .http
            .post(&url)
            .json(&ExtractRequest::new(image_base64))
            .send()
            .await
            .map_err(|e| RelayError::Network {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| "An unexpected error occurred on the server.".to_string());
            return Err(RelayError::Server { message });
        }

        response.json::<Value>().await.map_err(|e| RelayError::Network {
            detail: e.to_string(),
        })
    }
}
