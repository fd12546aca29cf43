//! Repository for the `exam_periods` table.

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::exam_period::{CreateExamPeriod, ExamPeriod};

const COLUMNS: &str =
    "id, name, start_date, end_date, blocks_regular_classes, department_id, created_at";

pub struct ExamPeriodRepo;

impl ExamPeriodRepo {
    /// Insert a new exam period, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExamPeriod,
    ) -> Result<ExamPeriod, sqlx::Error> {
        let query = format!(
            "INSERT INTO exam_periods \
                (name, start_date, end_date, blocks_regular_classes, department_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExamPeriod>(&query)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.blocks_regular_classes)
            .bind(input.department_id)
            .fetch_one(pool)
            .await
    }

    /// Find an exam period by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ExamPeriod>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exam_periods WHERE id = $1");
        sqlx::query_as::<_, ExamPeriod>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All exam periods, ordered by start date.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ExamPeriod>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exam_periods ORDER BY start_date");
        sqlx::query_as::<_, ExamPeriod>(&query).fetch_all(pool).await
    }

    /// Delete an exam period. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exam_periods WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
