//! Faculty member model.

use collegium_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `faculty` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Faculty {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub department_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
