use serde::{Deserialize, Serialize};

/// One product listing as the model is instructed to emit it.
///
/// The relay passes the model's JSON through unvalidated; this type is the
/// lenient view the capture client uses for tabular display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedProduct {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Error body returned by the relay on any failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
