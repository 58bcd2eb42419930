#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use keygate_api::auth::jwt::JwtConfig;
use keygate_api::config::ServerConfig;
use keygate_api::router::build_app_router;
use keygate_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// The database URL is unused because the pool is supplied by `sqlx::test`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: String::new(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_query_timeout_ms: 5000,
        db_max_connections: 5,
        session_cleanup_interval_secs: 3600,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            issuer: "keygate".to_string(),
            access_token_expiry_mins: 15,
            session_expiry_days: 7,
        },
    }
}

/// Build the application state the router runs on.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config())
}

/// Build the full application router (same middleware stack as production).
pub fn build_test_app(pool: PgPool) -> Router {
    let state = test_state(pool);
    let config = test_config();
    build_app_router(state, &config)
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// Send a request with a raw `Authorization` header value.
pub async fn get_with_authorization(app: Router, uri: &str, authorization: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, authorization)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request(Method::POST, uri, None, &body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), &body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// POST a raw, possibly malformed body.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request(Method::PATCH, uri, Some(token), &body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Auth flow helpers
// ---------------------------------------------------------------------------

/// Sign up through the API and return the created user's id.
pub async fn sign_up(app: Router, name: &str, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "name": name, "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().expect("id").to_string()
}

/// Sign in through the API and return the `data` object of the response.
pub async fn sign_in(app: Router, email: &str, password: &str) -> Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Sign up then sign in, returning `(user_id, access_token, refresh_token)`.
pub async fn register_and_sign_in(app: Router, name: &str, email: &str) -> (String, String, String) {
    let user_id = sign_up(app.clone(), name, email, "secret1").await;
    let tokens = sign_in(app, email, "secret1").await;
    (
        user_id,
        tokens["access_token"].as_str().expect("access").to_string(),
        tokens["refresh_token"].as_str().expect("refresh").to_string(),
    )
}
