//! Planner for the faculty-replace operation: reassign every matching
//! active entry from one faculty member to another.
//!
//! Credit/hour accounting lives on subjects and is untouched by the
//! reassignment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use collegium_core::error::CoreError;
use collegium_core::timetable::EntryKind;
use collegium_core::types::DbId;
use collegium_db::repositories::{BatchRepo, FacultyRepo, TimetableEntryRepo};

use crate::engine::plan::{Plan, PlannedItem};
use crate::error::{AppError, AppResult};

/// Parameters for `POST /timetable/bulk/faculty-replace`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyReplaceParams {
    pub current_faculty_id: DbId,
    pub new_faculty_id: DbId,
    /// Restrict the replacement to these batches; `None` means everywhere.
    #[serde(default)]
    pub batch_ids: Option<Vec<DbId>>,
    /// Only entries dated at/after this date are touched (recurring
    /// undated entries always match).
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}

/// Validate references and project the reassigned entry set.
pub async fn plan(pool: &PgPool, params: &FacultyReplaceParams) -> AppResult<Plan> {
    if params.current_faculty_id == params.new_faculty_id {
        return Err(AppError::Core(CoreError::Validation(
            "current and new faculty must differ".into(),
        )));
    }

    FacultyRepo::find_by_id(pool, params.current_faculty_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Faculty",
            id: params.current_faculty_id,
        })?;
    FacultyRepo::find_by_id(pool, params.new_faculty_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Faculty",
            id: params.new_faculty_id,
        })?;

    if let Some(batch_ids) = &params.batch_ids {
        if batch_ids.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "batch_ids must be non-empty when given".into(),
            )));
        }
        let missing = BatchRepo::missing_ids(pool, batch_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "unknown batch ids: {missing:?}"
            ))));
        }
    }

    let entries = TimetableEntryRepo::list_active_for_faculty(
        pool,
        params.current_faculty_id,
        params.batch_ids.as_deref(),
        params.effective_date,
    )
    .await?;

    let mut items = Vec::with_capacity(entries.len());
    let mut drafts = Vec::with_capacity(entries.len());
    let mut rewritten_entry_ids = Vec::with_capacity(entries.len());

    for entry in &entries {
        let mut draft = entry.to_draft()?;
        if let EntryKind::Lesson { subject_id, .. } = draft.kind {
            draft.kind = EntryKind::Lesson {
                subject_id,
                faculty_id: params.new_faculty_id,
            };
        }
        items.push(PlannedItem::SetFaculty {
            entry_id: entry.id,
            faculty_id: params.new_faculty_id,
        });
        drafts.push(draft);
        rewritten_entry_ids.push(entry.id);
    }

    let mut batch_ids: Vec<DbId> = entries.iter().map(|e| e.batch_id).collect();
    batch_ids.sort_unstable();
    batch_ids.dedup();
    let departments = BatchRepo::department_map(pool, &batch_ids).await?;

    Ok(Plan {
        items,
        drafts,
        rewritten_entry_ids,
        pre_skipped: Vec::new(),
        warnings: Vec::new(),
        departments,
    })
}
