//! Sign-up, sign-in, sign-out and session renewal.
//!
//! Composes the token signer, the session store and the user repository.
//! Every failure leaving this module is already one of the non-leaking
//! [`CoreError`] categories or a sanitized internal error.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use keygate_core::error::CoreError;
use keygate_db::models::user::{CreateUser, User};
use keygate_db::repositories::UserRepo;
use keygate_db::timeouts::{with_timeout, TimeoutError};
use keygate_db::{is_unique_violation, DbPool};

use super::jwt::{TokenError, TokenPair, TokenSigner};
use super::models::{SignInRequest, SignUpRequest};
use super::password::{hash_password, verify_dummy_password, verify_password};
use super::session::{SessionError, SessionStore, TokenKind};
use crate::error::{AppError, AppResult};

/// Auth use cases. Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    signer: Arc<TokenSigner>,
    sessions: SessionStore,
    session_ttl: chrono::Duration,
    query_timeout: Duration,
}

impl AuthService {
    pub fn new(
        pool: DbPool,
        signer: Arc<TokenSigner>,
        sessions: SessionStore,
        session_ttl: chrono::Duration,
        query_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            signer,
            sessions,
            session_ttl,
            query_timeout,
        }
    }

    /// Register a new account.
    ///
    /// The email must not belong to any user, live or soft-deleted.
    pub async fn sign_up(&self, input: &SignUpRequest) -> AppResult<User> {
        input.validate()?;

        let existing = with_timeout(
            self.query_timeout,
            UserRepo::find_by_email(&self.pool, &input.email),
        )
        .await?;
        if existing.is_some() {
            return Err(CoreError::AlreadyExists { entity: "User" }.into());
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

        let create = CreateUser {
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash,
        };
        let user = match with_timeout(self.query_timeout, UserRepo::create(&self.pool, &create)).await
        {
            Ok(user) => user,
            // Lost a race with a concurrent sign-up for the same email.
            Err(TimeoutError::Database(e)) if is_unique_violation(&e, Some("uq_users_email")) => {
                return Err(CoreError::AlreadyExists { entity: "User" }.into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Authenticate with email and password and open a new session.
    ///
    /// Unknown email, deleted account and wrong password are reported
    /// identically. The pair is only returned once its session is recorded.
    pub async fn sign_in(&self, input: &SignInRequest) -> AppResult<TokenPair> {
        input.validate()?;

        let found = with_timeout(
            self.query_timeout,
            UserRepo::find_by_email(&self.pool, &input.email),
        )
        .await?
        .filter(|u| !u.is_deleted());
        let Some(user) = found else {
            verify_dummy_password(&input.password);
            return Err(CoreError::InvalidCredentials.into());
        };

        let password_valid = verify_password(&input.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !password_valid {
            tracing::debug!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(CoreError::InvalidCredentials.into());
        }

        let pair = self.signer.generate_pair(user.id).map_err(token_error)?;
        let expires_at = Utc::now() + self.session_ttl;

        self.sessions
            .create(user.id, &pair.refresh_token, &pair.jti, expires_at)
            .await
            .map_err(session_error)?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(pair)
    }

    /// Terminate the session paired with `access_jti`.
    pub async fn sign_out(&self, access_jti: &str) -> AppResult<()> {
        match self.sessions.delete(access_jti).await {
            Ok(()) => Ok(()),
            Err(SessionError::NotFound | SessionError::Expired) => {
                Err(CoreError::NotFound { entity: "Session" }.into())
            }
            Err(SessionError::Persistence(e)) => Err(e.into()),
        }
    }

    /// Exchange a refresh token for a new pair, rotating the session in place.
    ///
    /// The presented refresh token and its paired access token stop working
    /// as soon as this succeeds. If a concurrent renewal or sign-out touched
    /// the row first, this fails and the pair generated here is discarded.
    pub async fn renew_session(&self, raw_refresh_token: &str) -> AppResult<TokenPair> {
        let session = self
            .sessions
            .is_valid(raw_refresh_token, TokenKind::Refresh)
            .await
            .map_err(invalid_session)?;

        let owner = with_timeout(
            self.query_timeout,
            UserRepo::find_by_id(&self.pool, session.user_id),
        )
        .await?;
        if owner.is_none() {
            tracing::debug!(session_id = %session.id, "Renewal rejected: owner no longer exists");
            return Err(CoreError::InvalidSession.into());
        }

        let pair = self
            .signer
            .generate_pair(session.user_id)
            .map_err(token_error)?;
        let expires_at = Utc::now() + self.session_ttl;

        self.sessions
            .rotate(&session, &pair.refresh_token, &pair.jti, expires_at)
            .await
            .map_err(invalid_session)?;

        tracing::info!(user_id = %session.user_id, session_id = %session.id, "Session renewed");
        Ok(pair)
    }
}

fn token_error(err: TokenError) -> AppError {
    AppError::InternalError(err.to_string())
}

fn session_error(err: SessionError) -> AppError {
    match err {
        SessionError::Persistence(e) => e.into(),
        other => AppError::InternalError(other.to_string()),
    }
}

/// Collapse "missing" and "expired" into one indistinguishable rejection.
fn invalid_session(err: SessionError) -> AppError {
    match err {
        SessionError::NotFound | SessionError::Expired => CoreError::InvalidSession.into(),
        SessionError::Persistence(e) => e.into(),
    }
}
