//! Route definitions for the `/users` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require auth.
///
/// ```text
/// GET    /                     -> list
/// PATCH  /change-password/me   -> change_password
/// GET    /{id}                 -> get
/// PATCH  /{id}                 -> update (self only)
/// DELETE /{id}                 -> delete (self only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/change-password/me", patch(users::change_password))
        .route(
            "/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
}
