//! Repository for the `faculty` table (reference checks only).

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::faculty::Faculty;

const COLUMNS: &str = "id, name, email, department_id, is_active, created_at, updated_at";

pub struct FacultyRepo;

impl FacultyRepo {
    /// Find an active faculty member by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Faculty>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM faculty WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Faculty>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
