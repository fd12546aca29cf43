//! Planner for the template-apply operation: run the recurrence
//! generator once per target batch and collect the resulting drafts.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use collegium_core::error::CoreError;
use collegium_core::recurrence;
use collegium_core::types::DbId;
use collegium_db::repositories::{BatchRepo, TemplateRepo, TimeSlotRepo};

use crate::engine::facts;
use crate::engine::plan::{Plan, PlannedItem, PreSkippedItem};
use crate::error::{AppError, AppResult};

/// Parameters for `POST /timetable/bulk/template-apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateApplyParams {
    pub template_id: DbId,
    pub target_batch_ids: Vec<DbId>,
}

/// Validate references and expand the template once per target batch.
pub async fn plan(pool: &PgPool, params: &TemplateApplyParams) -> AppResult<Plan> {
    if params.target_batch_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "target_batch_ids must be non-empty".into(),
        )));
    }

    let template = TemplateRepo::find_by_id(pool, params.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableTemplate",
            id: params.template_id,
        })?;

    let slot = TimeSlotRepo::find_by_id(pool, template.time_slot_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimeSlot",
            id: template.time_slot_id,
        })?;

    let missing = BatchRepo::missing_ids(pool, &params.target_batch_ids).await?;
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "unknown batch ids: {missing:?}"
        ))));
    }
    let departments = BatchRepo::department_map(pool, &params.target_batch_ids).await?;

    let calendar = facts::load(pool).await?;

    let mut items = Vec::new();
    let mut drafts = Vec::new();
    let mut pre_skipped = Vec::new();
    let mut warnings = Vec::new();

    for &batch_id in &params.target_batch_ids {
        let department_id = departments.get(&batch_id).copied().ok_or_else(|| {
            CoreError::Internal(format!("no department mapping for batch {batch_id}"))
        })?;
        let rule = template.to_rule(slot.duration_minutes, Some(batch_id))?;
        let expansion = recurrence::expand(&rule, &calendar, department_id)?;

        if expansion.cap_reached {
            warnings.push(format!(
                "template {} hit the {}-cycle generation cap for batch {batch_id}; \
                 check its end condition",
                template.id,
                recurrence::MAX_CYCLES
            ));
        }
        for skip in &expansion.skipped {
            pre_skipped.push(PreSkippedItem {
                reason: "blackout".to_string(),
                detail: serde_json::json!({
                    "batch_id": batch_id,
                    "date": skip.date,
                    "skip": skip.reason,
                }),
            });
        }
        for draft in expansion.drafts {
            items.push(PlannedItem::Create {
                draft: draft.clone(),
            });
            drafts.push(draft);
        }
    }

    Ok(Plan {
        items,
        drafts,
        rewritten_entry_ids: Vec::new(),
        pre_skipped,
        warnings,
        departments,
    })
}
