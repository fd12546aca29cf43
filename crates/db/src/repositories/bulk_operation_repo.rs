//! Repository for the `bulk_operations` table.
//!
//! Status flips are guarded by the current status in the WHERE clause so
//! a cooperative cancel and a finishing executor cannot both win: the
//! executor's terminal update affects zero rows once the record reads
//! `cancelled`, and the record still ends terminal.

use sqlx::PgPool;

use collegium_core::bulk::{BulkStatus, OperationKind};
use collegium_core::types::DbId;

use crate::models::bulk_operation::BulkOperation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, operation_kind, status, requested_by, parameters, progress_pct, \
    result, error_message, created_at, started_at, finished_at";

/// Provides CRUD operations for bulk operations.
pub struct BulkOperationRepo;

impl BulkOperationRepo {
    /// Insert a new pending operation record at submission time.
    pub async fn create(
        pool: &PgPool,
        kind: OperationKind,
        requested_by: DbId,
        parameters: &serde_json::Value,
    ) -> Result<BulkOperation, sqlx::Error> {
        let query = format!(
            "INSERT INTO bulk_operations (operation_kind, requested_by, parameters) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BulkOperation>(&query)
            .bind(kind.as_str())
            .bind(requested_by)
            .bind(parameters)
            .fetch_one(pool)
            .await
    }

    /// Find a single operation by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BulkOperation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bulk_operations WHERE id = $1");
        sqlx::query_as::<_, BulkOperation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip a pending operation to running. Returns `false` if it was
    /// cancelled before the executor picked it up.
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bulk_operations SET status = 'running', started_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update progress while running.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        progress_pct: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bulk_operations SET progress_pct = $2 \
             WHERE id = $1 AND status = 'running'",
        )
        .bind(id)
        .bind(progress_pct.clamp(0, 100))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a running operation completed with its result document.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE bulk_operations \
             SET status = 'completed', progress_pct = 100, result = $2, finished_at = NOW() \
             WHERE id = $1 AND status = 'running'",
        )
        .bind(id)
        .bind(result)
        .execute(pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Mark a running operation failed, capturing the error and whatever
    /// partial report is useful for diagnosis (nothing was committed).
    pub async fn fail(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
        result: Option<&serde_json::Value>,
    ) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE bulk_operations \
             SET status = 'failed', error_message = $2, result = $3, finished_at = NOW() \
             WHERE id = $1 AND status IN ('pending', 'running')",
        )
        .bind(id)
        .bind(error_message)
        .bind(result)
        .execute(pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Request cancellation. Only pending/running operations can flip;
    /// the row returned reflects the new state, `None` means the
    /// operation was already terminal (or missing).
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<BulkOperation>, sqlx::Error> {
        let query = format!(
            "UPDATE bulk_operations \
             SET status = 'cancelled', finished_at = NOW() \
             WHERE id = $1 AND status IN ('pending', 'running') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BulkOperation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a cancel has been requested. Consulted by the executor
    /// between phases, never mid-transaction.
    pub async fn is_cancelled(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM bulk_operations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(status.as_deref() == Some(BulkStatus::Cancelled.as_str()))
    }

    /// List operations, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<BulkStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BulkOperation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bulk_operations \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BulkOperation>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
