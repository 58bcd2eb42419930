use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keygate_core::error::CoreError;
use keygate_core::validation::FieldErrors;
use keygate_db::timeouts::TimeoutError;
use serde::Serialize;

use crate::response::timestamp_now;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the error envelope:
///
/// ```text
/// { "success": false, "error": { "code", "message", "details"? }, "timestamp" }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `keygate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body was not valid JSON for the target type.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] JsonRejection),

    /// An internal error with a human-readable message. Never shown to clients.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<TimeoutError> for AppError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Database(e) => AppError::Database(e),
            timeout @ TimeoutError::Timeout(_) => AppError::InternalError(timeout.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a FieldErrors>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
    timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                if let CoreError::Validation(fields) = core {
                    details = Some(fields);
                }
                classify_core_error(core)
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::InvalidJson(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_JSON".to_string(),
                    "Invalid JSON".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code,
                message,
                details,
            },
            timestamp: timestamp_now(),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, String, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR".to_string(),
        "An internal error occurred".to_string(),
    )
}

/// Map a domain error onto its HTTP status, code and client-facing message.
fn classify_core_error(err: &CoreError) -> (StatusCode, String, String) {
    let status = match err {
        CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::InvalidCredentials | CoreError::InvalidToken | CoreError::InvalidSession => {
            StatusCode::UNAUTHORIZED
        }
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        CoreError::InvalidIdentifierFormat => StatusCode::BAD_REQUEST,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            return internal();
        }
    };
    let message = match err {
        CoreError::Forbidden(msg) => msg.clone(),
        other => other.to_string(),
    };
    (status, err.code(), message)
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409
///   with a message that does not name the constraint.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String, String) {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                tracing::debug!(constraint, "Unique constraint violated");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT".to_string(),
                    "A resource with the same unique value already exists".to_string(),
                );
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

