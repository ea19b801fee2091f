use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Instruction sent with every page image. Demands a bare JSON array; the
/// model ignores the no-markdown clause often enough that the reply still
/// goes through fence stripping.
const EXTRACTION_PROMPT: &str = r#"You are an expert data extraction assistant.
Analyze the image of a product catalogue page.
Extract all distinct products. For each, provide its name, price, and description.
Respond ONLY with a valid JSON array of objects. Do not include markdown.
Schema: { "productName": "string", "price": "string", "description": "string" }"#;

/// All four harm categories are dialed to BLOCK_NONE: catalogue pages are
/// benign and a safety block would read as a missing reply.
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json|```").unwrap());

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client. One outbound call per extraction, no
/// retry, transport-default timeouts. The API key lives here and in the
/// request URL only; error paths strip the URL before surfacing details.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Send one page image to the model and parse its reply into JSON.
    ///
    /// The parsed value is returned as-is: whatever shape the model
    /// produced, valid JSON is enough.
    pub async fn extract_products(&self, image_data: &str) -> AppResult<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(EXTRACTION_PROMPT),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/png",
                            data: image_data,
                        }),
                    },
                ],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            // without_url: the request URL carries the API key.
            .map_err(|e| AppError::upstream(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Gemini API returned HTTP {}: {}",
                status,
                truncate(&detail, 512)
            )));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(e.without_url().to_string()))?;

        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| AppError::upstream("The AI model did not return any data."))?;

        debug!(reply_chars = text.len(), "Received model reply");

        let cleaned = strip_code_fences(text);
        serde_json::from_str(&cleaned).map_err(|e| AppError::parse(e.to_string()))
    }
}

/// Remove any ```json / ``` fencing the model wrapped its reply in.
/// Stripping is idempotent; the result is also whitespace-trimmed.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
