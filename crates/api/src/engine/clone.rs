//! Planner for the clone operation: copy one batch's active schedule
//! into another batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use collegium_core::conflict::BatchDepartments;
use collegium_core::error::CoreError;
use collegium_core::timetable::EntryKind;
use collegium_core::types::DbId;
use collegium_db::repositories::{BatchRepo, SubjectRepo, TimetableEntryRepo};

use crate::engine::plan::{Plan, PlannedItem};
use crate::error::{AppError, AppResult};

/// Parameters for `POST /timetable/bulk/clone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneParams {
    pub source_batch_id: DbId,
    pub target_batch_id: DbId,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Keep subject/faculty assignments on cloned lessons. When false,
    /// lessons are cloned as placeholder custom events (the subject is
    /// named in the title, faculty left for later assignment), so no
    /// faculty double-booking is introduced.
    #[serde(default = "default_true")]
    pub preserve_faculty: bool,
}

fn default_true() -> bool {
    true
}

/// Validate references and project the cloned entry set.
pub async fn plan(pool: &PgPool, params: &CloneParams) -> AppResult<Plan> {
    if params.source_batch_id == params.target_batch_id {
        return Err(AppError::Core(CoreError::Validation(
            "source and target batch must differ".into(),
        )));
    }
    if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
        if to < from {
            return Err(AppError::Core(CoreError::Validation(format!(
                "date range end {to} precedes start {from}"
            ))));
        }
    }

    let source = BatchRepo::find_by_id(pool, params.source_batch_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Batch",
            id: params.source_batch_id,
        })?;
    let target = BatchRepo::find_by_id(pool, params.target_batch_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Batch",
            id: params.target_batch_id,
        })?;

    let entries = TimetableEntryRepo::list_active_for_batch(
        pool,
        source.id,
        params.date_from,
        params.date_to,
    )
    .await?;

    let mut items = Vec::with_capacity(entries.len());
    let mut drafts = Vec::with_capacity(entries.len());

    for entry in &entries {
        let mut draft = entry.to_draft()?;
        draft.batch_id = target.id;
        draft.source_template_id = None;

        if !params.preserve_faculty {
            if let EntryKind::Lesson { subject_id, .. } = draft.kind {
                let title = match SubjectRepo::find_by_id(pool, subject_id).await? {
                    Some(subject) => format!("{} (faculty TBD)", subject.name),
                    None => format!("Subject {subject_id} (faculty TBD)"),
                };
                draft.kind = EntryKind::CustomEvent { title, color: None };
            }
        }

        items.push(PlannedItem::Create {
            draft: draft.clone(),
        });
        drafts.push(draft);
    }

    let mut departments = BatchDepartments::new();
    departments.insert(source.id, source.department_id);
    departments.insert(target.id, target.department_id);

    Ok(Plan {
        items,
        drafts,
        rewritten_entry_ids: Vec::new(),
        pre_skipped: Vec::new(),
        warnings: Vec::new(),
        departments,
    })
}
