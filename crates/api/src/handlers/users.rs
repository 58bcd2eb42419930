//! Handlers for the `/users` resource.
//!
//! Every route requires authentication. Writes are restricted to the caller's
//! own account.

use axum::extract::{Path, State};
use axum::Json;
use keygate_core::error::CoreError;
use keygate_core::ids::parse_id;
use keygate_core::types::DbId;
use keygate_core::validation::FieldValidator;
use keygate_db::is_unique_violation;
use keygate_db::models::user::{UpdateUser, UserResponse};
use keygate_db::repositories::UserRepo;
use keygate_db::timeouts::{with_timeout, TimeoutError};
use serde::Deserialize;

use crate::auth::models::{NAME_LENGTH, NEW_PASSWORD_LENGTH};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Request body for `PATCH /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut v = FieldValidator::new();
        if let Some(name) = &self.name {
            v.length("name", name, NAME_LENGTH.0, NAME_LENGTH.1);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        v.finish()
    }
}

/// Request body for `PATCH /users/change-password/me`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let (min, max) = NEW_PASSWORD_LENGTH;
        let mut v = FieldValidator::new();
        v.length("current_password", &self.current_password, min, max)
            .length("new_password", &self.new_password, min, max);
        v.finish()
    }
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = with_timeout(state.config.db_query_timeout(), UserRepo::list(&state.pool)).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse::new(data)))
}

/// GET /api/v1/users/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let id = parse_id(&id)?;
    let user = with_timeout(
        state.config.db_query_timeout(),
        UserRepo::find_by_id(&state.pool, id),
    )
    .await?
    .ok_or_else(user_not_found)?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PATCH /api/v1/users/{id}
///
/// Update the caller's own name and/or email.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let id = parse_id(&id)?;
    ensure_self(&auth, id, "cannot modify another user")?;
    input.validate()?;

    let timeout = state.config.db_query_timeout();

    if let Some(email) = &input.email {
        let owner = with_timeout(timeout, UserRepo::find_by_email(&state.pool, email)).await?;
        if owner.is_some_and(|u| u.id != id) {
            return Err(CoreError::AlreadyExists { entity: "User" }.into());
        }
    }

    let changes = UpdateUser {
        name: input.name,
        email: input.email,
    };
    let user = match with_timeout(timeout, UserRepo::update(&state.pool, id, &changes)).await {
        Ok(user) => user.ok_or_else(user_not_found)?,
        Err(TimeoutError::Database(e)) if is_unique_violation(&e, Some("uq_users_email")) => {
            return Err(CoreError::AlreadyExists { entity: "User" }.into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "User profile updated");
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PATCH /api/v1/users/change-password/me
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let timeout = state.config.db_query_timeout();
    let user = with_timeout(timeout, UserRepo::find_by_id(&state.pool, auth.user_id))
        .await?
        .ok_or_else(user_not_found)?;

    let matches = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !matches {
        return Err(CoreError::Forbidden("Current password is incorrect".into()).into());
    }

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let updated = with_timeout(
        timeout,
        UserRepo::update_password(&state.pool, user.id, &new_hash),
    )
    .await?;
    if !updated {
        return Err(user_not_found().into());
    }

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// DELETE /api/v1/users/{id}
///
/// Soft-delete the caller's own account and end all of its sessions.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let id = parse_id(&id)?;
    ensure_self(&auth, id, "cannot delete another user")?;

    let sessions = with_timeout(
        state.config.db_query_timeout(),
        UserRepo::soft_delete_with_sessions(&state.pool, id),
    )
    .await?
    .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %id, sessions, "User deleted");
    Ok(Json(DataResponse::new(MessageResponse::new(
        "User deleted successfully",
    ))))
}

fn user_not_found() -> CoreError {
    CoreError::NotFound { entity: "User" }
}

fn ensure_self(auth: &AuthUser, target: DbId, reason: &str) -> Result<(), CoreError> {
    if auth.user_id != target {
        return Err(CoreError::Forbidden(reason.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_update_is_valid() {
        let req = UpdateUserRequest {
            name: None,
            email: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_checks_only_present_fields() {
        let req = UpdateUserRequest {
            name: Some("A".into()),
            email: None,
        };
        let errors = assert_matches!(req.validate(), Err(CoreError::Validation(e)) => e);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn change_password_bounds_both_fields() {
        let req = ChangePasswordRequest {
            current_password: String::new(),
            new_password: "x".repeat(40),
        };
        let errors = assert_matches!(req.validate(), Err(CoreError::Validation(e)) => e);
        assert!(errors.contains_key("current_password"));
        assert!(errors.contains_key("new_password"));
    }
}
