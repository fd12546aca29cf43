//! Periodic sweep of expired undo ledger records.
//!
//! Expiry is otherwise enforced lazily (an expired record is purged when
//! its undo is attempted); the sweep keeps the table from accumulating
//! records nobody ever tries to consume.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use collegium_db::repositories::UndoRepo;

/// How often the sweep runs. Records live at most five minutes, so one
/// minute keeps the backlog to a handful of rows.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the undo expiry sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Undo expiry sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Undo expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match UndoRepo::delete_expired(&pool, Utc::now()).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Undo expiry sweep: purged stale records");
                        } else {
                            tracing::debug!("Undo expiry sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Undo expiry sweep failed");
                    }
                }
            }
        }
    }
}
