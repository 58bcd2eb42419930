//! Login session model and DTOs.

use keygate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// `token_hash` is the SHA-256 digest of the refresh token; the raw value is
/// never persisted.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub token_hash: String,
    pub access_jti: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// A session is usable strictly before its expiry instant.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// DTO for inserting a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub access_jti: String,
    pub expires_at: Timestamp,
}

/// Replacement credential material applied by a rotation.
#[derive(Debug)]
pub struct RotateSession {
    pub token_hash: String,
    pub access_jti: String,
    pub expires_at: Timestamp,
}
