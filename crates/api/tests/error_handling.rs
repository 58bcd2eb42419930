//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and message inside the error envelope. They do NOT
//! need an HTTP server -- they call `IntoResponse` directly on `AppError` values.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use keygate_api::error::AppError;
use keygate_core::error::CoreError;
use keygate_db::models::user::CreateUser;
use keygate_db::repositories::UserRepo;
use keygate_db::timeouts::TimeoutError;
use sqlx::PgPool;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn validation_error_returns_422_with_details() {
    let mut fields = BTreeMap::new();
    fields.insert("email".to_string(), "Invalid email format".to_string());

    let (status, json) = error_to_response(CoreError::Validation(fields).into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(json["error"]["message"], "Validation failed");
    assert_eq!(json["error"]["details"]["email"], "Invalid email format");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn auth_failures_return_401() {
    for (err, code) in [
        (CoreError::InvalidCredentials, "INVALID_CREDENTIALS"),
        (CoreError::InvalidToken, "INVALID_TOKEN"),
        (CoreError::InvalidSession, "INVALID_SESSION"),
    ] {
        let (status, json) = error_to_response(err.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], code);
        assert!(json["error"].get("details").is_none());
    }
}

#[tokio::test]
async fn not_found_uses_entity_code() {
    let (status, json) = error_to_response(CoreError::NotFound { entity: "Session" }.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "SESSION_NOT_FOUND");
    assert_eq!(json["error"]["message"], "Session not found");
}

#[tokio::test]
async fn already_exists_returns_409() {
    let (status, json) =
        error_to_response(CoreError::AlreadyExists { entity: "User" }.into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn invalid_identifier_returns_400() {
    let (status, json) = error_to_response(CoreError::InvalidIdentifierFormat.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_ID");
}

#[tokio::test]
async fn forbidden_shows_its_reason() {
    let (status, json) =
        error_to_response(CoreError::Forbidden("Current password is incorrect".into()).into())
            .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "FORBIDDEN");
    assert_eq!(json["error"]["message"], "Current password is incorrect");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    for err in [
        AppError::InternalError("pool exhausted at 10.0.0.3".into()),
        AppError::Core(CoreError::Internal("secret detail".into())),
        AppError::Database(sqlx::Error::PoolTimedOut),
        TimeoutError::Timeout(Duration::from_millis(5)).into(),
    ] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unique_violation_is_conflict_without_schema_details(pool: PgPool) {
    let input = CreateUser {
        name: "Ana".to_string(),
        email: "ana@x.com".to_string(),
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(&pool, &input).await.unwrap();
    let err = UserRepo::create(&pool, &input).await.unwrap_err();

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(!message.contains("uq_users_email"), "{message}");
    assert!(!message.contains("constraint"), "{message}");
}
