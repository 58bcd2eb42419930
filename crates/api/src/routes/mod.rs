pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 sign up (public)
/// /auth/signin                 sign in (public)
/// /auth/signout                sign out (requires auth)
/// /auth/renew-session          renew session (public, refresh token)
///
/// /users                       list (requires auth)
/// /users/change-password/me    change own password
/// /users/{id}                  get, update (self), delete (self)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
