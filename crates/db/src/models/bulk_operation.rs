//! Bulk operation record: the durable progress/audit row for
//! fire-and-track execution.

use collegium_core::bulk::BulkStatus;
use collegium_core::error::CoreError;
use collegium_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bulk_operations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BulkOperation {
    pub id: DbId,
    pub operation_kind: String,
    pub status: String,
    pub requested_by: DbId,
    pub parameters: serde_json::Value,
    pub progress_pct: i32,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl BulkOperation {
    pub fn status_enum(&self) -> Result<BulkStatus, CoreError> {
        BulkStatus::parse(&self.status)
    }
}
