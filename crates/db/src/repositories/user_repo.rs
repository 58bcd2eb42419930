//! Repository for the `users` table.

use keygate_core::ids::new_id;
use keygate_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::SessionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at, deleted_at";

/// Provides CRUD operations for users.
///
/// Lookups by id and listings only see live users. The email lookup also
/// returns soft-deleted rows so that emails stay globally unique.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a fresh id, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(new_id())
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a live user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive), including soft-deleted users.
    ///
    /// Callers must check [`User::is_deleted`] before treating the result as
    /// an active account.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List live users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update profile fields of a live user. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_optional(pool)
            .await
    }

    /// Replace a live user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a user by setting `deleted_at`.
    ///
    /// Returns `true` if a live row was updated. Sessions are left alone; use
    /// [`UserRepo::soft_delete_with_sessions`] to end them in the same
    /// transaction.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a live user and delete every session they own, atomically.
    ///
    /// Returns the number of deleted sessions, or `None` with nothing written
    /// if no live row with the given `id` exists.
    pub async fn soft_delete_with_sessions(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::soft_delete(&mut *tx, id).await? {
            return Ok(None);
        }
        let sessions = SessionRepo::delete_all_for_user(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some(sessions))
    }
}
