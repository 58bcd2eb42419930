//! Per-call deadlines for database operations.
//!
//! Every session-store call is bounded so a stalled connection surfaces as an
//! error instead of pinning the request until the HTTP timeout fires.

use std::future::Future;
use std::time::Duration;

/// Default deadline for a single query (5 seconds).
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// A database call that failed or did not finish in time.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Run `future` with a deadline of `duration`.
///
/// Dropping the inner future on timeout cancels the query; single-statement
/// writes are atomic, so cancellation never leaves a partial update behind.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(TimeoutError::Database(e)),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}
