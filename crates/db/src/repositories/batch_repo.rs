//! Repository for the `batches` table. The engine only reads batches, to
//! validate references and resolve department scope; batch CRUD lives
//! outside the scheduling core.

use std::collections::HashMap;

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::batch::Batch;

const COLUMNS: &str =
    "id, name, department_id, semester, academic_year, is_active, created_at, updated_at";

pub struct BatchRepo;

impl BatchRepo {
    /// Find an active batch by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Batch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batches WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Batch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Of the given ids, the ones that do NOT resolve to an active batch.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let found: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM batches WHERE id = ANY($1) AND is_active",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Batch id -> department id for the given batches. Calendar fact
    /// scope resolution runs off this map.
    pub async fn department_map(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<HashMap<DbId, DbId>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT id, department_id FROM batches WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
