//! Repository for the `time_slots` table.

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::time_slot::{CreateTimeSlot, TimeSlot};

const COLUMNS: &str = "id, name, start_time, end_time, duration_minutes, sort_order, \
    is_active, created_at, updated_at";

pub struct TimeSlotRepo;

impl TimeSlotRepo {
    /// Insert a new time slot. Duration is computed from the time pair.
    pub async fn create(pool: &PgPool, input: &CreateTimeSlot) -> Result<TimeSlot, sqlx::Error> {
        let duration_minutes = input
            .end_time
            .signed_duration_since(input.start_time)
            .num_minutes() as i32;
        let query = format!(
            "INSERT INTO time_slots (name, start_time, end_time, duration_minutes, sort_order) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeSlot>(&query)
            .bind(&input.name)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(duration_minutes)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a time slot by ID, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimeSlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM time_slots WHERE id = $1");
        sqlx::query_as::<_, TimeSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List time slots in display order.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<TimeSlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_slots WHERE is_active OR $1 \
             ORDER BY sort_order, start_time"
        );
        sqlx::query_as::<_, TimeSlot>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a slot. Returns `false` if it was already inactive or
    /// does not exist.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE time_slots SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
