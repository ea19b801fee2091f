//! Glean catalogue extraction service
//!
//! Turns one page of a PDF product catalogue into structured product
//! listings by relaying a rendered page image to a multimodal AI model.
//! Ships with a capture client for driving the render-and-extract flow
//! against a local PDF.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
