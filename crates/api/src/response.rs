//! Shared response envelope types for API handlers.
//!
//! Successful responses use `{ "success": true, "data": ..., "timestamp": ... }`.
//! Use [`DataResponse`] instead of ad-hoc `serde_json::json!` bodies to get
//! compile-time type safety and consistent serialization. Error bodies are
//! produced by [`crate::error::AppError`].

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp_now(),
        }
    }
}

/// Payload for endpoints that only report an outcome.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Current time as RFC 3339 UTC, e.g. `2026-01-01T12:00:00Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let json = serde_json::to_value(DataResponse::new(MessageResponse::new("ok"))).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["message"], "ok");
        let ts = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with('Z'));
    }
}
