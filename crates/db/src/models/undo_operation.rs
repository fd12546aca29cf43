//! Undo ledger record.

use collegium_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `undo_operations` table. `snapshot` holds the full
/// prior field values of the deleted entity; `metadata` is free-form
/// display context (name, related ids).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UndoOperation {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub snapshot: serde_json::Value,
    pub metadata: serde_json::Value,
    pub requested_by: DbId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}
