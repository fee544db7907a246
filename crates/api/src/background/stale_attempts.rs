//! Periodic sweep that closes out abandoned paper attempts and drops dead
//! auth sessions.
//!
//! An attempt left `in_progress` past the staleness window is completed with
//! a zero score so it stops blocking new attempts and never earns points.
//! Expired and revoked refresh sessions are deleted on the same cadence.

use std::time::Duration;

use chrono::Utc;
use praxia_db::repositories::{PaperAttemptRepo, SessionRepo};
use praxia_rewards::STALE_ATTEMPT_AFTER_SECS;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until cancelled. The first sweep fires immediately.
pub async fn run(pool: PgPool, sweep_interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Stale attempt sweeper started"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sweep(&pool).await;
            }
            _ = cancel.cancelled() => {
                tracing::info!("Stale attempt sweeper shutting down");
                break;
            }
        }
    }
}

async fn sweep(pool: &PgPool) {
    let cutoff = Utc::now() - chrono::Duration::seconds(STALE_ATTEMPT_AFTER_SECS);
    match PaperAttemptRepo::expire_stale(pool, cutoff).await {
        Ok(0) => {}
        Ok(expired) => {
            tracing::info!(expired, "Expired stale paper attempts");
        }
        Err(e) => {
            tracing::error!(error = %e, "Stale attempt sweep failed");
        }
    }

    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(removed) => {
            tracing::debug!(removed, "Removed expired auth sessions");
        }
        Err(e) => {
            tracing::error!(error = %e, "Session cleanup failed");
        }
    }
}
