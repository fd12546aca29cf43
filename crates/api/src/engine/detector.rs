//! Async front of the core conflict detector: assembles the stored
//! snapshot and calendar facts, then runs the pure detection.
//!
//! Every entry creation path in the service goes through here; nothing
//! writes to the entry store without a report.

use sqlx::PgPool;

use collegium_core::conflict::{self, BatchDepartments, ConflictReport};
use collegium_core::timetable::{EntryDraft, ExistingEntry};
use collegium_core::types::DbId;

use crate::engine::facts;
use crate::error::{AppError, AppResult};

/// Run conflict detection for `drafts` against current stored state.
///
/// `exclude_entry_ids` removes entries this same operation is about to
/// rewrite from the stored snapshot (their old slots are vacated in the
/// same transaction that fills the new ones).
pub async fn detect(
    pool: &PgPool,
    drafts: &[EntryDraft],
    departments: &BatchDepartments,
    exclude_entry_ids: &[DbId],
) -> AppResult<ConflictReport> {
    for draft in drafts {
        draft.validate()?;
    }

    let mut batch_ids: Vec<DbId> = drafts.iter().map(|d| d.batch_id).collect();
    batch_ids.sort_unstable();
    batch_ids.dedup();

    let mut faculty_ids: Vec<DbId> = drafts.iter().filter_map(|d| d.kind.faculty_id()).collect();
    faculty_ids.sort_unstable();
    faculty_ids.dedup();

    let rows = collegium_db::repositories::TimetableEntryRepo::conflict_candidates(
        pool,
        &batch_ids,
        &faculty_ids,
    )
    .await?;

    let existing: Vec<ExistingEntry> = rows
        .iter()
        .filter(|r| !exclude_entry_ids.contains(&r.id))
        .map(|r| r.to_existing())
        .collect::<Result<_, _>>()?;

    let facts = facts::load(pool).await?;

    conflict::detect(drafts, &existing, &facts, departments).map_err(AppError::from)
}
