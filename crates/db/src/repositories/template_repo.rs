//! Repository for the `timetable_templates` table.

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::template::{CreateTimetableTemplate, TimetableTemplate};

const COLUMNS: &str = "id, name, batch_id, subject_id, faculty_id, time_slot_id, \
    day_of_week, recurrence_pattern, start_date, end_date, end_condition, total_hours, \
    is_active, created_at, updated_at";

pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimetableTemplate,
    ) -> Result<TimetableTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO timetable_templates \
                (name, batch_id, subject_id, faculty_id, time_slot_id, day_of_week, \
                 recurrence_pattern, start_date, end_date, end_condition, total_hours) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableTemplate>(&query)
            .bind(&input.name)
            .bind(input.batch_id)
            .bind(input.subject_id)
            .bind(input.faculty_id)
            .bind(input.time_slot_id)
            .bind(input.day_of_week)
            .bind(&input.recurrence_pattern)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.end_condition)
            .bind(input.total_hours)
            .fetch_one(pool)
            .await
    }

    /// Find an active template by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimetableTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM timetable_templates WHERE id = $1 AND is_active");
        sqlx::query_as::<_, TimetableTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active templates, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<TimetableTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_templates WHERE is_active \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, TimetableTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a template. Generated entries keep their provenance
    /// note and are unaffected.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE timetable_templates SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
