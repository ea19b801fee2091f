use serde::{Deserialize, Serialize};

/// Body of `POST /api/extract`.
///
/// `imageData` is a base64-encoded PNG with no data-URI prefix. The field
/// defaults to empty when absent so the handler can answer with the fixed
/// 400 body instead of a deserialization rejection.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractRequest {
    #[serde(rename = "imageData", default)]
    pub image_data: String,
}

impl ExtractRequest {
    pub fn new(image_data: impl Into<String>) -> Self {
        Self {
            image_data: image_data.into(),
        }
    }
}
