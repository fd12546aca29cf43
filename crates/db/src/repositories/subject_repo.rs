//! Repository for the `subjects` table (reference checks only).

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::subject::Subject;

const COLUMNS: &str =
    "id, name, code, department_id, weekly_hours, is_active, created_at, updated_at";

pub struct SubjectRepo;

impl SubjectRepo {
    /// Find an active subject by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subjects WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
