//! HTTP layer: request handlers and response data models.
//!
//! - **[`handlers`]**: Axum route handlers for the upload form, the
//!   upload-and-separate pipeline, and stem downloads
//! - **[`models`]**: Types backing the rendered responses

pub mod handlers;
pub mod models;
