//! Planner for the reschedule operation: move every dated entry in a
//! source range onto a target range, by constant shift or ordinal map.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use collegium_core::error::CoreError;
use collegium_core::reschedule::{
    project_date, DateRange, Exclusions, MoveType, Projection,
};
use collegium_core::timetable::DayOfWeek;
use collegium_core::types::DbId;
use collegium_db::repositories::{BatchRepo, TimetableEntryRepo};

use crate::engine::facts;
use crate::engine::plan::{Plan, PlannedItem, PreSkippedItem};
use crate::error::{AppError, AppResult};

/// Parameters for `POST /timetable/bulk/reschedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleParams {
    pub source_range: DateRange,
    pub target_range: DateRange,
    /// Restrict to these batches; `None` means every batch.
    #[serde(default)]
    pub batch_ids: Option<Vec<DbId>>,
    pub move_type: MoveType,
}

/// Validate ranges and project every affected entry onto its new date.
///
/// Weekend/blackout handling comes from the options bag: excluded target
/// dates push forward to the next eligible date; items with none are
/// skipped with a recorded reason, as are map-mode overflows.
pub async fn plan(
    pool: &PgPool,
    params: &RescheduleParams,
    exclusions: Exclusions,
) -> AppResult<Plan> {
    params.source_range.validate("source")?;
    params.target_range.validate("target")?;

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

    let entries = TimetableEntryRepo::list_active_in_range(
        pool,
        params.source_range.start,
        params.source_range.end,
        params.batch_ids.as_deref(),
    )
    .await?;

    let mut batch_ids: Vec<DbId> = entries.iter().map(|e| e.batch_id).collect();
    batch_ids.sort_unstable();
    batch_ids.dedup();
    let departments = BatchRepo::department_map(pool, &batch_ids).await?;

    let calendar = facts::load(pool).await?;

    let mut items = Vec::new();
    let mut drafts = Vec::new();
    let mut rewritten_entry_ids = Vec::new();
    let mut pre_skipped = Vec::new();

    for entry in &entries {
        // list_active_in_range only returns dated entries.
        let Some(old_date) = entry.entry_date else {
            continue;
        };
        let department_id = departments.get(&entry.batch_id).copied().ok_or_else(|| {
            CoreError::Internal(format!("no department mapping for batch {}", entry.batch_id))
        })?;

        match project_date(
            old_date,
            &params.source_range,
            &params.target_range,
            params.move_type,
            exclusions,
            &calendar,
            department_id,
        ) {
            Projection::Moved { to, .. } => {
                let day = DayOfWeek::from_date(to);
                let mut draft = entry.to_draft()?;
                draft.entry_date = Some(to);
                draft.day_of_week = day;

                items.push(PlannedItem::MoveDate {
                    entry_id: entry.id,
                    entry_date: to,
                    day_of_week: day.as_i16(),
                });
                drafts.push(draft);
                rewritten_entry_ids.push(entry.id);
            }
            Projection::Skipped { from, reason } => {
                pre_skipped.push(PreSkippedItem {
                    reason: format!("{reason:?}"),
                    detail: serde_json::json!({
                        "entry_id": entry.id,
                        "from": from,
                    }),
                });
            }
        }
    }

    Ok(Plan {
        items,
        drafts,
        rewritten_entry_ids,
        pre_skipped,
        warnings: Vec::new(),
        departments,
    })
}
