//! Repository for the `timetable_entries` table -- the entry store.
//!
//! Every component reads and writes entries through here. Deactivation is
//! the only delete; the partial unique indexes
//! `uq_timetable_entries_batch_slot` / `uq_timetable_entries_faculty_slot`
//! enforce the double-booking invariants against concurrent writers that
//! race past application-level detection.

use sqlx::{PgPool, Postgres, Transaction};

use collegium_core::types::DbId;

use crate::models::timetable_entry::{
    CreateTimetableEntry, EntryListQuery, TimetableEntry, UpdateTimetableEntry,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, batch_id, subject_id, faculty_id, event_title, event_color, \
    time_slot_id, day_of_week, entry_date, entry_type, source_template_id, \
    is_active, notes, created_by, created_at, updated_at";

/// Provides CRUD operations for timetable entries.
pub struct TimetableEntryRepo;

impl TimetableEntryRepo {
    /// Insert a new entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimetableEntry,
    ) -> Result<TimetableEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let entry = Self::create_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Insert a new entry inside an existing transaction.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateTimetableEntry,
    ) -> Result<TimetableEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO timetable_entries \
                (batch_id, subject_id, faculty_id, event_title, event_color, \
                 time_slot_id, day_of_week, entry_date, entry_type, \
                 source_template_id, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(input.batch_id)
            .bind(input.subject_id)
            .bind(input.faculty_id)
            .bind(&input.event_title)
            .bind(&input.event_color)
            .bind(input.time_slot_id)
            .bind(input.day_of_week)
            .bind(input.entry_date)
            .bind(&input.entry_type)
            .bind(input.source_template_id)
            .bind(&input.notes)
            .bind(input.created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a single entry by ID, active or not.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimetableEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timetable_entries WHERE id = $1");
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List entries with optional filters, ordered by day then slot.
    pub async fn list(
        pool: &PgPool,
        q: &EntryListQuery,
    ) -> Result<Vec<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_entries \
             WHERE ($1::bigint IS NULL OR batch_id = $1) \
               AND ($2::bigint IS NULL OR faculty_id = $2) \
               AND ($3::smallint IS NULL OR day_of_week = $3) \
               AND ($4::date IS NULL OR entry_date >= $4) \
               AND ($5::date IS NULL OR entry_date <= $5) \
               AND (is_active OR $6) \
             ORDER BY day_of_week, time_slot_id, entry_date NULLS FIRST"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(q.batch_id)
            .bind(q.faculty_id)
            .bind(q.day_of_week)
            .bind(q.date_from)
            .bind(q.date_to)
            .bind(q.include_inactive)
            .fetch_all(pool)
            .await
    }

    /// All active entries for one batch, optionally bounded to a date
    /// range (recurring entries with no date always match).
    pub async fn list_active_for_batch(
        pool: &PgPool,
        batch_id: DbId,
        date_from: Option<chrono::NaiveDate>,
        date_to: Option<chrono::NaiveDate>,
    ) -> Result<Vec<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_entries \
             WHERE batch_id = $1 AND is_active \
               AND (entry_date IS NULL OR \
                    (($2::date IS NULL OR entry_date >= $2) \
                     AND ($3::date IS NULL OR entry_date <= $3))) \
             ORDER BY day_of_week, time_slot_id"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(batch_id)
            .bind(date_from)
            .bind(date_to)
            .fetch_all(pool)
            .await
    }

    /// Snapshot for conflict detection: every active entry touching any
    /// of the given batches or faculty members. The detector does the
    /// exact key matching in memory.
    pub async fn conflict_candidates(
        pool: &PgPool,
        batch_ids: &[DbId],
        faculty_ids: &[DbId],
    ) -> Result<Vec<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_entries \
             WHERE is_active AND (batch_id = ANY($1) OR faculty_id = ANY($2))"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(batch_ids)
            .bind(faculty_ids)
            .fetch_all(pool)
            .await
    }

    /// Active entries assigned to a faculty member, optionally scoped to
    /// batches and to dates at/after `effective_date`.
    pub async fn list_active_for_faculty(
        pool: &PgPool,
        faculty_id: DbId,
        batch_scope: Option<&[DbId]>,
        effective_date: Option<chrono::NaiveDate>,
    ) -> Result<Vec<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_entries \
             WHERE faculty_id = $1 AND is_active \
               AND ($2::bigint[] IS NULL OR batch_id = ANY($2)) \
               AND ($3::date IS NULL OR entry_date IS NULL OR entry_date >= $3) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(faculty_id)
            .bind(batch_scope)
            .bind(effective_date)
            .fetch_all(pool)
            .await
    }

    /// Active dated entries inside a date range, optionally scoped to
    /// batches. Recurring (undated) entries are not returned: a date
    /// shift has nothing to move on them.
    pub async fn list_active_in_range(
        pool: &PgPool,
        date_from: chrono::NaiveDate,
        date_to: chrono::NaiveDate,
        batch_scope: Option<&[DbId]>,
    ) -> Result<Vec<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timetable_entries \
             WHERE is_active AND entry_date BETWEEN $1 AND $2 \
               AND ($3::bigint[] IS NULL OR batch_id = ANY($3)) \
             ORDER BY entry_date, time_slot_id"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(date_from)
            .bind(date_to)
            .bind(batch_scope)
            .fetch_all(pool)
            .await
    }

    /// Patch notes / entry type.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimetableEntry,
    ) -> Result<Option<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE timetable_entries SET \
                entry_type = COALESCE($2, entry_type), \
                notes = COALESCE($3, notes), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .bind(&input.entry_type)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate an entry, returning the prior row for snapshotting.
    /// `None` if the entry does not exist or is already inactive.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimetableEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE timetable_entries SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reassign the faculty member on one entry, inside a transaction.
    pub async fn set_faculty_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        faculty_id: DbId,
    ) -> Result<TimetableEntry, sqlx::Error> {
        let query = format!(
            "UPDATE timetable_entries SET faculty_id = $2, updated_at = NOW() \
             WHERE id = $1 AND is_active \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .bind(faculty_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Move one dated entry to a new date (and matching day of week),
    /// inside a transaction.
    pub async fn set_date_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        entry_date: chrono::NaiveDate,
        day_of_week: i16,
    ) -> Result<TimetableEntry, sqlx::Error> {
        let query = format!(
            "UPDATE timetable_entries \
             SET entry_date = $2, day_of_week = $3, updated_at = NOW() \
             WHERE id = $1 AND is_active \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .bind(entry_date)
            .bind(day_of_week)
            .fetch_one(&mut **tx)
            .await
    }

    /// Restore an entry from an undo snapshot, keeping its original id so
    /// references to it stay valid. Re-inserts if the row was purged,
    /// otherwise overwrites in place and reactivates.
    pub async fn restore_from_snapshot(
        pool: &PgPool,
        snapshot: &TimetableEntry,
    ) -> Result<TimetableEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO timetable_entries \
                (id, batch_id, subject_id, faculty_id, event_title, event_color, \
                 time_slot_id, day_of_week, entry_date, entry_type, \
                 source_template_id, is_active, notes, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $13, $14, NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
                batch_id = EXCLUDED.batch_id, \
                subject_id = EXCLUDED.subject_id, \
                faculty_id = EXCLUDED.faculty_id, \
                event_title = EXCLUDED.event_title, \
                event_color = EXCLUDED.event_color, \
                time_slot_id = EXCLUDED.time_slot_id, \
                day_of_week = EXCLUDED.day_of_week, \
                entry_date = EXCLUDED.entry_date, \
                entry_type = EXCLUDED.entry_type, \
                source_template_id = EXCLUDED.source_template_id, \
                is_active = TRUE, \
                notes = EXCLUDED.notes, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(snapshot.id)
            .bind(snapshot.batch_id)
            .bind(snapshot.subject_id)
            .bind(snapshot.faculty_id)
            .bind(&snapshot.event_title)
            .bind(&snapshot.event_color)
            .bind(snapshot.time_slot_id)
            .bind(snapshot.day_of_week)
            .bind(snapshot.entry_date)
            .bind(&snapshot.entry_type)
            .bind(snapshot.source_template_id)
            .bind(&snapshot.notes)
            .bind(snapshot.created_by)
            .bind(snapshot.created_at)
            .fetch_one(pool)
            .await
    }

    /// Whether any entry (active or not) references a time slot. Guards
    /// slot deletion.
    pub async fn any_for_time_slot(pool: &PgPool, time_slot_id: DbId) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM timetable_entries WHERE time_slot_id = $1",
        )
        .bind(time_slot_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }
}
