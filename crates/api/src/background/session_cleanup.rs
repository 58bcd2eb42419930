//! Periodic removal of expired session rows.
//!
//! Expired sessions are already unusable; this only keeps the table small.
//! Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::session::SessionStore;

/// Run the cleanup loop until `cancel` is triggered.
///
/// The first purge happens immediately. Failures are logged and retried on
/// the next tick.
pub async fn run(sessions: SessionStore, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match sessions.purge_expired().await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session cleanup: purged expired sessions");
                    }
                    Ok(_) => tracing::debug!("Session cleanup: nothing to purge"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup: purge failed"),
                }
            }
        }
    }
}
