//! Repository for the `undo_operations` ledger.

use sqlx::PgPool;

use collegium_core::types::{DbId, Timestamp};

use crate::models::undo_operation::UndoOperation;

const COLUMNS: &str =
    "id, entity_type, entity_id, snapshot, metadata, requested_by, created_at, expires_at";

pub struct UndoRepo;

impl UndoRepo {
    /// Record a pre-mutation snapshot. `expires_at` is computed by the
    /// caller from the clamped TTL.
    pub async fn create(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
        snapshot: &serde_json::Value,
        metadata: &serde_json::Value,
        requested_by: DbId,
        expires_at: Timestamp,
    ) -> Result<UndoOperation, sqlx::Error> {
        let query = format!(
            "INSERT INTO undo_operations \
                (entity_type, entity_id, snapshot, metadata, requested_by, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UndoOperation>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .bind(snapshot)
            .bind(metadata)
            .bind(requested_by)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a ledger record by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UndoOperation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM undo_operations WHERE id = $1");
        sqlx::query_as::<_, UndoOperation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a consumed or stale record. Returns `true` if a row was
    /// removed; a second undo of the same id therefore sees nothing.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM undo_operations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Purge every record that expired at or before `now`. Used by the
    /// background sweep.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM undo_operations WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
