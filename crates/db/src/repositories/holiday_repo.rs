//! Repository for the `holidays` table.
//!
//! The scheduling engine reads holidays via the calendar facts loader;
//! deletion hard-removes the row after its snapshot lands in the undo
//! ledger.

use sqlx::PgPool;

use collegium_core::types::DbId;

use crate::models::holiday::{CreateHoliday, Holiday};

const COLUMNS: &str =
    "id, holiday_date, name, holiday_type, department_id, is_recurring, created_at";

pub struct HolidayRepo;

impl HolidayRepo {
    /// Insert a new holiday, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateHoliday) -> Result<Holiday, sqlx::Error> {
        let query = format!(
            "INSERT INTO holidays (holiday_date, name, holiday_type, department_id, is_recurring) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(input.holiday_date)
            .bind(&input.name)
            .bind(&input.holiday_type)
            .bind(input.department_id)
            .bind(input.is_recurring)
            .fetch_one(pool)
            .await
    }

    /// Find a holiday by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Holiday>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holidays WHERE id = $1");
        sqlx::query_as::<_, Holiday>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All holidays, ordered by date. The table is small; the facts
    /// loader filters scope and recurrence in memory.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Holiday>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holidays ORDER BY holiday_date");
        sqlx::query_as::<_, Holiday>(&query).fetch_all(pool).await
    }

    /// Delete a holiday, returning the removed row for snapshotting.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Holiday>, sqlx::Error> {
        let query = format!("DELETE FROM holidays WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Holiday>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Re-insert a holiday from an undo snapshot with its original id.
    pub async fn restore_from_snapshot(
        pool: &PgPool,
        snapshot: &Holiday,
    ) -> Result<Holiday, sqlx::Error> {
        let query = format!(
            "INSERT INTO holidays \
                (id, holiday_date, name, holiday_type, department_id, is_recurring, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                holiday_date = EXCLUDED.holiday_date, \
                name = EXCLUDED.name, \
                holiday_type = EXCLUDED.holiday_type, \
                department_id = EXCLUDED.department_id, \
                is_recurring = EXCLUDED.is_recurring \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(snapshot.id)
            .bind(snapshot.holiday_date)
            .bind(&snapshot.name)
            .bind(&snapshot.holiday_type)
            .bind(snapshot.department_id)
            .bind(snapshot.is_recurring)
            .bind(snapshot.created_at)
            .fetch_one(pool)
            .await
    }
}
