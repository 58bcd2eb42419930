//! Handlers for the `/auth` resource (sign-up, sign-in, sign-out, renewal).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use keygate_db::models::user::UserResponse;

use crate::auth::models::{AuthTokens, RenewSessionRequest, SignInRequest, SignUpRequest};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// POST /api/v1/auth/signup
///
/// Register a new account. Returns 201 with the created user.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignUpRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let user = state.auth.sign_up(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(UserResponse::from(&user))),
    ))
}

/// POST /api/v1/auth/signin
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn signin(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignInRequest>,
) -> AppResult<Json<DataResponse<AuthTokens>>> {
    let pair = state.auth.sign_in(&input).await?;
    Ok(Json(DataResponse::new(AuthTokens::from(pair))))
}

/// POST /api/v1/auth/signout
///
/// Revoke the session paired with the presented access token.
pub async fn signout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    state.auth.sign_out(&auth_user.jti).await?;
    tracing::info!(user_id = %auth_user.user_id, "User signed out");
    Ok(Json(DataResponse::new(MessageResponse::new(
        "Signed out successfully",
    ))))
}

/// POST /api/v1/auth/renew-session
///
/// Exchange a refresh token for a new pair. The old pair stops working.
pub async fn renew_session(
    State(state): State<AppState>,
    AppJson(input): AppJson<RenewSessionRequest>,
) -> AppResult<Json<DataResponse<AuthTokens>>> {
    input.validate()?;
    let pair = state.auth.renew_session(&input.refresh_token).await?;
    Ok(Json(DataResponse::new(AuthTokens::from(pair))))
}
