//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use keygate_core::error::CoreError;
use keygate_core::ids::parse_id;
use keygate_core::types::DbId;
use keygate_db::repositories::UserRepo;
use keygate_db::timeouts::with_timeout;

use crate::auth::session::{SessionError, TokenKind};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, derived from a valid access token whose session and
/// owner are both still live.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Owner of the session.
    pub user_id: DbId,
    /// Identifier of the presented access token; keys its session row.
    pub jti: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(CoreError::InvalidToken)?;

        let claims = state
            .signer
            .validate(token)
            .map_err(|_| CoreError::InvalidToken)?;

        // A signature alone is not enough: the paired session must still exist.
        let session = match state.sessions.is_valid(&claims.jti, TokenKind::Access).await {
            Ok(session) => session,
            Err(SessionError::NotFound | SessionError::Expired) => {
                return Err(CoreError::InvalidToken.into());
            }
            Err(SessionError::Persistence(e)) => return Err(e.into()),
        };
        if session.user_id.to_string() != claims.user_id {
            tracing::warn!(session_id = %session.id, "Access token user does not match its session");
            return Err(CoreError::InvalidToken.into());
        }

        let owner = with_timeout(
            state.config.db_query_timeout(),
            UserRepo::find_by_id(&state.pool, session.user_id),
        )
        .await?;
        if owner.is_none() {
            tracing::debug!(session_id = %session.id, "Access token owner no longer exists");
            return Err(CoreError::InvalidToken.into());
        }

        let user_id = parse_id(&claims.user_id)?;
        parse_id(&claims.jti)?;

        Ok(AuthUser {
            user_id,
            jti: claims.jti,
        })
    }
}

/// Extract `<value>` from an `Authorization: Bearer <value>` header.
///
/// The header must split into exactly two space-separated parts, the first
/// being `Bearer` and the second non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
