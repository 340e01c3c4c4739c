//! Request extractors whose rejections use the `AppError` envelope.

use crate::error::AppError;
use axum::extract::FromRequest;

/// `axum::Json` body; malformed or mistyped bodies become `AppError::InvalidBody`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
