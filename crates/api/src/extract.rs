//! Request body extraction.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections become `AppError::Validation`, so malformed
/// bodies get the same `{"message": ...}` shape as every other error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
