//! HTTP request handlers.
//!
//! - [`uploads`]: upload form and the upload-and-separate pipeline
//! - [`downloads`]: streaming download of produced stems
//!
//! Handlers return [`crate::errors::Error`], which converts to the
//! appropriate HTTP status with a plain-text body.

pub mod downloads;
pub mod uploads;
