//! Subject model.

use collegium_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subjects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub department_id: DbId,
    pub weekly_hours: i16,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
