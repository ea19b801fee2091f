//! Unit tests for individual components

use std::path::{Path, PathBuf};

use glean::{
    client::{
        reduce, CopyNotice, ExtractorSession, MemoryClipboard, MockPageRenderer, RelayClient,
        SessionEvent, SessionState, COPY_NOTICE_TTL,
    },
    config::Config,
    error::AppError,
    models::{ErrorBody, ExtractRequest, ExtractedProduct},
    services::strip_code_fences,
};
use serde_json::json;
use std::env;

#[test]
fn test_config_from_env() {
    env::remove_var("GEMINI_MODEL");
    env::remove_var("GEMINI_BASE_URL");
    env::set_var("SERVER_HOST", "127.0.0.1");
    env::set_var("SERVER_PORT", "5050");
    env::set_var("MAX_IMAGE_SIZE_MB", "4");
    env::set_var("GEMINI_API_KEY", "unit-test-key");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 5050);
    assert_eq!(config.max_image_size_mb, 4);
    assert_eq!(config.gemini_api_key, "unit-test-key");
    assert_eq!(config.gemini_model, "gemini-1.5-flash");
    assert_eq!(
        config.gemini_base_url,
        "https://generativelanguage.googleapis.com"
    );

    env::remove_var("SERVER_HOST");
    env::remove_var("SERVER_PORT");
    env::remove_var("MAX_IMAGE_SIZE_MB");
    env::remove_var("GEMINI_API_KEY");
}

#[test]
fn test_error_codes() {
    assert_eq!(AppError::MissingImageData.error_code(), "MISSING_IMAGE_DATA");
    assert_eq!(AppError::upstream("x").error_code(), "UPSTREAM_ERROR");
    assert_eq!(AppError::parse("x").error_code(), "PARSE_ERROR");
}

#[test]
fn test_error_status_codes() {
    use axum::http::StatusCode;

    assert_eq!(AppError::MissingImageData.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::upstream("x").status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::parse("x").status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        AppError::MissingImageData.to_string(),
        "No image data provided."
    );

    let err: AppError = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
    match err {
        AppError::Parse { message } => assert!(!message.is_empty()),
        _ => panic!("Expected Parse error"),
    }
}

#[test]
fn test_strip_code_fences() {
    let fenced = "```json\n[{\"productName\":\"Widget\"}]\n```";
    assert_eq!(strip_code_fences(fenced), "[{\"productName\":\"Widget\"}]");

    // Bare fences without the language tag.
    let bare = "```\n[1, 2]\n```";
    assert_eq!(strip_code_fences(bare), "[1, 2]");

    // Unfenced input only gets trimmed.
    assert_eq!(strip_code_fences("  [1, 2]\n"), "[1, 2]");
}

#[test]
fn test_strip_code_fences_is_idempotent() {
    let fenced = "```json\n{\"a\": 1}\n```";
    let once = strip_code_fences(fenced);
    let twice = strip_code_fences(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_extract_request_serde() {
    // Missing imageData defaults to empty rather than failing to parse.
    let req: ExtractRequest = serde_json::from_str("{}").unwrap();
    assert!(req.image_data.is_empty());

    let req: ExtractRequest = serde_json::from_str(r#"{"imageData":"aGk="}"#).unwrap();
    assert_eq!(req.image_data, "aGk=");

    let body = serde_json::to_value(ExtractRequest::new("aGk=")).unwrap();
    assert_eq!(body, json!({"imageData": "aGk="}));
}

#[test]
fn test_extracted_product_serde() {
    let product: ExtractedProduct =
        serde_json::from_value(json!({"productName": "Widget", "price": "$5"})).unwrap();
    assert_eq!(product.product_name, "Widget");
    assert_eq!(product.price, "$5");
    assert!(product.description.is_none());

    let round_tripped = serde_json::to_value(&product).unwrap();
    assert_eq!(round_tripped, json!({"productName": "Widget", "price": "$5"}));
}

#[test]
fn test_error_body_serde() {
    let body = serde_json::to_value(ErrorBody {
        message: "No image data provided.".to_string(),
        details: None,
    })
    .unwrap();
    assert_eq!(body, json!({"message": "No image data provided."}));
}

// ── Reducer ──────────────────────────────────────────────────────────────────

fn loaded_state(num_pages: usize) -> SessionState {
    let mut state = SessionState::default();
    reduce(
        &mut state,
        SessionEvent::FileSelected {
            path: PathBuf::from("catalogue.pdf"),
        },
    );
    reduce(&mut state, SessionEvent::DocumentLoaded { num_pages });
    state
}

#[test]
fn test_initial_state() {
    let state = SessionState::default();
    assert!(state.pdf_path.is_none());
    assert!(state.num_pages.is_none());
    assert_eq!(state.current_page, 1);
    assert!(!state.loading);
}

#[test]
fn test_prev_page_clamps_at_first() {
    let mut state = loaded_state(5);
    assert_eq!(state.current_page, 1);
    reduce(&mut state, SessionEvent::PrevPage);
    assert_eq!(state.current_page, 1);
}

#[test]
fn test_next_page_clamps_at_last() {
    let mut state = loaded_state(2);
    reduce(&mut state, SessionEvent::NextPage);
    assert_eq!(state.current_page, 2);
    reduce(&mut state, SessionEvent::NextPage);
    assert_eq!(state.current_page, 2);
}

#[test]
fn test_next_page_is_noop_before_document_load() {
    let mut state = SessionState::default();
    reduce(&mut state, SessionEvent::NextPage);
    assert_eq!(state.current_page, 1);
}

#[test]
fn test_new_file_resets_downstream_state() {
    let mut state = loaded_state(5);
    reduce(&mut state, SessionEvent::NextPage);
    reduce(
        &mut state,
        SessionEvent::ExtractionSucceeded {
            data: json!([{"productName": "Widget", "price": "$5"}]),
        },
    );

    reduce(
        &mut state,
        SessionEvent::FileSelected {
            path: PathBuf::from("other.pdf"),
        },
    );

    assert_eq!(state.pdf_path, Some(PathBuf::from("other.pdf")));
    assert!(state.num_pages.is_none());
    assert_eq!(state.current_page, 1);
    assert!(state.extracted.is_none());
    assert!(state.error.is_none());
}

#[test]
fn test_rejected_file_sets_error_and_clears_selection() {
    let mut state = loaded_state(5);
    reduce(&mut state, SessionEvent::FileRejected);
    assert!(state.pdf_path.is_none());
    assert_eq!(state.error.as_deref(), Some("Please select a valid PDF file."));
}

#[test]
fn test_extraction_start_clears_previous_outcome() {
    let mut state = loaded_state(1);
    reduce(
        &mut state,
        SessionEvent::ExtractionFailed {
            message: "boom".to_string(),
        },
    );

    reduce(&mut state, SessionEvent::ExtractionStarted);
    assert!(state.loading);
    assert!(state.error.is_none());
    assert!(state.extracted.is_none());
}

#[test]
fn test_loading_clears_on_both_outcomes() {
    let mut state = loaded_state(1);

    reduce(&mut state, SessionEvent::ExtractionStarted);
    reduce(
        &mut state,
        SessionEvent::ExtractionSucceeded { data: json!([]) },
    );
    assert!(!state.loading);

    reduce(&mut state, SessionEvent::ExtractionStarted);
    reduce(
        &mut state,
        SessionEvent::ExtractionFailed {
            message: "boom".to_string(),
        },
    );
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("boom"));
}

#[test]
fn test_copy_notice_lifecycle() {
    let mut state = loaded_state(1);
    reduce(
        &mut state,
        SessionEvent::CopyFinished {
            notice: CopyNotice::Copied,
        },
    );
    assert_eq!(state.copy_notice, Some(CopyNotice::Copied));
    assert_eq!(state.copy_notice.unwrap().message(), "Copied!");

    reduce(&mut state, SessionEvent::CopyNoticeExpired);
    assert!(state.copy_notice.is_none());

    assert_eq!(COPY_NOTICE_TTL.as_secs(), 2);
}

#[test]
fn test_products_view_is_lenient() {
    let mut state = loaded_state(1);
    reduce(
        &mut state,
        SessionEvent::ExtractionSucceeded {
            data: json!([{"productName": "Widget", "price": "$5", "description": "A widget"}]),
        },
    );
    let products = state.products().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_name, "Widget");

    // Arbitrary JSON passes through the relay; the typed view just
    // declines it.
    reduce(
        &mut state,
        SessionEvent::ExtractionSucceeded {
            data: json!({"unexpected": "shape"}),
        },
    );
    assert!(state.products().is_none());
}

// ── Session driver (no network) ──────────────────────────────────────────────

fn test_session(clipboard: MemoryClipboard) -> ExtractorSession {
    ExtractorSession::new(
        Box::new(MockPageRenderer::new(3)),
        RelayClient::new("http://127.0.0.1:9"),
        Box::new(clipboard),
    )
}

#[test]
fn test_select_file_rejects_non_pdf() {
    let mut session = test_session(MemoryClipboard::new());
    session.select_file(Path::new("notes.txt"));

    assert!(session.state().pdf_path.is_none());
    assert_eq!(
        session.state().error.as_deref(),
        Some("Please select a valid PDF file.")
    );
}

#[test]
fn test_select_missing_pdf_reports_read_failure() {
    let mut session = test_session(MemoryClipboard::new());
    session.select_file(Path::new("/nonexistent/catalogue.pdf"));

    assert!(session.state().num_pages.is_none());
    assert!(session.state().error.is_some());
}

#[test]
fn test_copy_formats_result_with_two_space_indent() {
    let clipboard = MemoryClipboard::new();
    let mut session = test_session(clipboard.clone());

    let data = json!([{"productName": "Widget", "price": "$5"}]);
    session.dispatch(SessionEvent::ExtractionSucceeded { data: data.clone() });
    session.copy_to_clipboard();

    assert_eq!(
        clipboard.contents().as_deref(),
        Some(serde_json::to_string_pretty(&data).unwrap().as_str())
    );
    assert_eq!(
        clipboard.contents().unwrap(),
        "[\n  {\n    \"price\": \"$5\",\n    \"productName\": \"Widget\"\n  }\n]"
    );
    assert_eq!(session.state().copy_notice, Some(CopyNotice::Copied));

    session.expire_copy_notice();
    assert!(session.state().copy_notice.is_none());
}

#[test]
fn test_copy_without_result_is_noop() {
    let clipboard = MemoryClipboard::new();
    let mut session = test_session(clipboard.clone());

    session.copy_to_clipboard();
    assert!(clipboard.contents().is_none());
    assert!(session.state().copy_notice.is_none());
}

#[test]
fn test_copy_failure_sets_failed_notice() {
    let mut session = test_session(MemoryClipboard::failing());
    session.dispatch(SessionEvent::ExtractionSucceeded { data: json!([]) });
    session.copy_to_clipboard();

    assert_eq!(session.state().copy_notice, Some(CopyNotice::Failed));
    assert_eq!(session.state().copy_notice.unwrap().message(), "Failed to copy.");
}
