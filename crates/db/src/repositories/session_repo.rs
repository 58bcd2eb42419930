//! Repository for the `sessions` table.
//!
//! Lookups return rows regardless of expiry so the caller can tell an expired
//! session apart from a missing one. Every write, however, only touches rows
//! that are still active at the supplied `now`.

use keygate_core::ids::new_id;
use keygate_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::session::{CreateSession, RotateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token_hash, access_jti, user_id, expires_at, created_at";

/// Provides storage operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session with a fresh id, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (id, token_hash, access_jti, user_id, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(new_id())
            .bind(&input.token_hash)
            .bind(&input.access_jti)
            .bind(input.user_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by the SHA-256 digest of its refresh token.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE token_hash = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by the `jti` of its currently paired access token.
    pub async fn find_by_access_jti(
        pool: &PgPool,
        access_jti: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE access_jti = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(access_jti)
            .fetch_optional(pool)
            .await
    }

    /// Replace the credential material of session `id` in place.
    ///
    /// The update only applies while the row still carries
    /// `expected_token_hash` and is unexpired at `now`. Concurrent rotations
    /// of the same row serialize on the row lock: the loser re-evaluates the
    /// predicate against the winner's new hash and matches nothing. Returns
    /// `None` when no row was updated.
    pub async fn rotate(
        pool: &PgPool,
        id: DbId,
        expected_token_hash: &str,
        input: &RotateSession,
        now: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET
                token_hash = $3,
                access_jti = $4,
                expires_at = $5
             WHERE id = $1 AND token_hash = $2 AND expires_at > $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(expected_token_hash)
            .bind(&input.token_hash)
            .bind(&input.access_jti)
            .bind(input.expires_at)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete the active session paired with `access_jti`.
    ///
    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete_by_access_jti(
        pool: &PgPool,
        access_jti: &str,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE access_jti = $1 AND expires_at > $2")
            .bind(access_jti)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every session owned by a user. Returns the count of deleted rows.
    ///
    /// Takes a connection so it can join the caller's transaction.
    pub async fn delete_all_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired at or before `now`. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
