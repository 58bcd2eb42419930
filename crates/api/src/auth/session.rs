//! Session store: the stateful half of authentication.
//!
//! One row per live refresh credential. Refresh tokens are hashed with
//! SHA-256 before they touch the database; access-token ids (`jti`) are not
//! secret and are stored as-is. Every call runs under a per-call deadline.

use std::time::Duration;

use chrono::Utc;
use keygate_core::hashing::sha256_hex;
use keygate_core::types::{DbId, Timestamp};
use keygate_db::models::session::{CreateSession, RotateSession, Session};
use keygate_db::repositories::SessionRepo;
use keygate_db::timeouts::{with_timeout, TimeoutError};
use keygate_db::DbPool;

/// Which credential a lookup is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Raw refresh token; hashed before lookup.
    Refresh,
    /// Access-token `jti`; looked up directly.
    Access,
}

/// Session store failure.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No matching row, or a write matched zero rows.
    #[error("Session not found")]
    NotFound,

    /// The row exists but its expiry has passed.
    #[error("Session expired")]
    Expired,

    /// The store could not be reached or the call timed out.
    #[error(transparent)]
    Persistence(#[from] TimeoutError),
}

/// Handle to the `sessions` table. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
    query_timeout: Duration,
}

impl SessionStore {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Record a new session for `user_id`, storing only the refresh token's hash.
    pub async fn create(
        &self,
        user_id: DbId,
        raw_refresh_token: &str,
        access_jti: &str,
        expires_at: Timestamp,
    ) -> Result<Session, SessionError> {
        let input = CreateSession {
            user_id,
            token_hash: hash_refresh_token(raw_refresh_token),
            access_jti: access_jti.to_string(),
            expires_at,
        };
        let session = with_timeout(self.query_timeout, SessionRepo::create(&self.pool, &input)).await?;

        tracing::debug!(session_id = %session.id, %user_id, "Session created");
        Ok(session)
    }

    /// Resolve an active session from a refresh token or an access `jti`.
    ///
    /// Fails with [`SessionError::Expired`] when the row exists but
    /// `now >= expires_at`.
    pub async fn is_valid(&self, token: &str, kind: TokenKind) -> Result<Session, SessionError> {
        let found = match kind {
            TokenKind::Refresh => {
                let hash = hash_refresh_token(token);
                with_timeout(
                    self.query_timeout,
                    SessionRepo::find_by_token_hash(&self.pool, &hash),
                )
                .await?
            }
            TokenKind::Access => {
                with_timeout(
                    self.query_timeout,
                    SessionRepo::find_by_access_jti(&self.pool, token),
                )
                .await?
            }
        };

        let session = found.ok_or(SessionError::NotFound)?;
        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    /// Replace the credential material of `current` in place.
    ///
    /// Only succeeds while the row still holds `current.token_hash` and has
    /// not expired; otherwise (already rotated by a concurrent renewal,
    /// deleted by sign-out, or expired) fails with [`SessionError::NotFound`]
    /// and nothing is written.
    pub async fn rotate(
        &self,
        current: &Session,
        new_raw_refresh_token: &str,
        new_access_jti: &str,
        new_expires_at: Timestamp,
    ) -> Result<Session, SessionError> {
        let input = RotateSession {
            token_hash: hash_refresh_token(new_raw_refresh_token),
            access_jti: new_access_jti.to_string(),
            expires_at: new_expires_at,
        };
        let rotated = with_timeout(
            self.query_timeout,
            SessionRepo::rotate(
                &self.pool,
                current.id,
                &current.token_hash,
                &input,
                Utc::now(),
            ),
        )
        .await?
        .ok_or(SessionError::NotFound)?;

        tracing::debug!(session_id = %rotated.id, "Session rotated");
        Ok(rotated)
    }

    /// Delete the active session paired with `access_jti`.
    ///
    /// Not idempotent: a second call fails with [`SessionError::NotFound`].
    pub async fn delete(&self, access_jti: &str) -> Result<(), SessionError> {
        let deleted = with_timeout(
            self.query_timeout,
            SessionRepo::delete_by_access_jti(&self.pool, access_jti, Utc::now()),
        )
        .await?;

        if deleted == 0 {
            return Err(SessionError::NotFound);
        }
        tracing::debug!("Session deleted");
        Ok(())
    }

    /// Physically remove sessions whose expiry has passed.
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let deleted = with_timeout(
            self.query_timeout,
            SessionRepo::delete_expired(&self.pool, Utc::now()),
        )
        .await?;
        Ok(deleted)
    }
}

/// SHA-256 hex digest of a refresh token, the only form ever persisted.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
