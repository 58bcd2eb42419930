//! Request extractors with envelope-shaped rejections.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] whose rejection is an [`AppError`],
/// so malformed bodies produce a 400 `INVALID_JSON` envelope instead of
/// axum's plain-text response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
