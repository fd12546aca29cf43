//! Shared execution protocol for bulk operations.
//!
//! A submitted operation is fire-and-track: the handler validates and
//! plans synchronously (so parameter/reference failures are immediate),
//! persists a pending `bulk_operations` row, and spawns [`run`]. The row
//! is the only progress channel and always reaches a terminal status.
//! Cancellation is cooperative: the flag is consulted between phases and
//! before the mutation transaction begins, never inside it.

use collegium_core::bulk::{BulkOptions, ConflictPolicy};
use collegium_core::conflict::ConflictReport;
use collegium_core::types::DbId;
use collegium_db::models::timetable_entry::CreateTimetableEntry;
use collegium_db::repositories::{BulkOperationRepo, TimetableEntryRepo};
use collegium_events::PlatformEvent;
use serde::Serialize;

use crate::engine::detector;
use crate::engine::plan::{Plan, PlannedItem};
use crate::error::AppResult;
use crate::state::AppState;

/// Projection returned synchronously for `dry_run` calls, and embedded in
/// the stored result for real runs.
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    pub plan: Plan,
    pub conflicts: ConflictReport,
}

/// Per-run counters stored in `bulk_operations.result`.
#[derive(Debug, Serialize)]
struct ExecutionReport<'a> {
    planned: usize,
    created: usize,
    updated: usize,
    skipped_conflicts: usize,
    pre_skipped: &'a [crate::engine::plan::PreSkippedItem],
    warnings: &'a [String],
    conflicts: &'a ConflictReport,
}

/// Detect conflicts for a plan. An empty plan yields an empty report
/// rather than tripping the detector's non-empty-input check.
pub async fn detect_plan(state: &AppState, plan: &Plan) -> AppResult<ConflictReport> {
    if plan.drafts.is_empty() {
        return Ok(ConflictReport {
            entries: Vec::new(),
            has_errors: false,
            has_warnings: false,
        });
    }
    detector::detect(
        &state.pool,
        &plan.drafts,
        &plan.departments,
        &plan.rewritten_entry_ids,
    )
    .await
}

/// Validate-and-preview path: detection only, nothing persisted.
pub async fn dry_run(state: &AppState, plan: Plan) -> AppResult<DryRunReport> {
    let conflicts = detect_plan(state, &plan).await?;
    Ok(DryRunReport { plan, conflicts })
}

/// Execute a submitted operation to its terminal status. Spawned on its
/// own task; never returns an error to the caller -- failures land in the
/// operation record.
pub async fn run(state: AppState, op_id: DbId, plan: Plan, options: BulkOptions, user_id: DbId) {
    // A cancel that lands before the task starts wins outright.
    match BulkOperationRepo::mark_running(&state.pool, op_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(op_id, "Bulk operation cancelled before start");
            return;
        }
        Err(e) => {
            tracing::error!(op_id, error = %e, "Failed to mark bulk operation running");
            let _ = BulkOperationRepo::fail(&state.pool, op_id, &e.to_string(), None).await;
            return;
        }
    }

    // --- Detect ---
    let conflicts = match detect_plan(&state, &plan).await {
        Ok(report) => report,
        Err(e) => {
            fail(&state, op_id, &e.to_string(), None).await;
            return;
        }
    };

    if conflicts.has_errors || conflicts.has_warnings {
        state.event_bus.publish(
            PlatformEvent::new("timetable.conflicts_detected")
                .with_source("bulk_operation", op_id)
                .with_actor(user_id)
                .with_payload(serde_json::json!({ "conflicts": &conflicts })),
        );
    }

    if conflicts.has_errors && options.conflict_policy == ConflictPolicy::Stop {
        let result = report_json(&plan, &conflicts, 0, 0, 0);
        fail(
            &state,
            op_id,
            "Aborted: conflicts detected under stop policy",
            Some(&result),
        )
        .await;
        return;
    }

    if is_cancelled(&state, op_id).await {
        return;
    }
    let _ = BulkOperationRepo::update_progress(&state.pool, op_id, 50).await;

    // --- Execute (one transaction) ---
    let error_indices: Vec<usize> = conflicts
        .entries
        .iter()
        .filter(|e| e.has_errors())
        .map(|e| e.index)
        .collect();

    let mut created = 0usize;
    let mut updated = 0usize;
    let mut skipped_conflicts = 0usize;

    let mut tx = match state.pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            fail(&state, op_id, &e.to_string(), None).await;
            return;
        }
    };

    let total = plan.items.len().max(1);
    for (i, item) in plan.items.iter().enumerate() {
        // Skip mode excludes conflicted items from the transaction's
        // scope by design; force mode lets the unique indexes arbitrate.
        if error_indices.contains(&i) && options.conflict_policy == ConflictPolicy::Skip {
            skipped_conflicts += 1;
            continue;
        }

        let applied = match item {
            PlannedItem::Create { draft } => {
                let input = CreateTimetableEntry::from_draft(draft, Some(user_id));
                TimetableEntryRepo::create_in_tx(&mut tx, &input)
                    .await
                    .map(|_| {
                        created += 1;
                    })
            }
            PlannedItem::SetFaculty {
                entry_id,
                faculty_id,
            } => TimetableEntryRepo::set_faculty_in_tx(&mut tx, *entry_id, *faculty_id)
                .await
                .map(|_| {
                    updated += 1;
                }),
            PlannedItem::MoveDate {
                entry_id,
                entry_date,
                day_of_week,
            } => {
                TimetableEntryRepo::set_date_in_tx(&mut tx, *entry_id, *entry_date, *day_of_week)
                    .await
                    .map(|_| {
                        updated += 1;
                    })
            }
        };

        if let Err(e) = applied {
            // Dropping the transaction rolls everything back; no partial
            // application survives.
            drop(tx);
            let result = report_json(&plan, &conflicts, created, updated, skipped_conflicts);
            fail(&state, op_id, &e.to_string(), Some(&result)).await;
            return;
        }

        // Progress is written through the pool, not the transaction.
        if i % (total / 5).max(1) == 0 {
            let pct = 50 + (i * 45 / total) as i32;
            let _ = BulkOperationRepo::update_progress(&state.pool, op_id, pct).await;
        }
    }

    if let Err(e) = tx.commit().await {
        let result = report_json(&plan, &conflicts, 0, 0, skipped_conflicts);
        fail(&state, op_id, &e.to_string(), Some(&result)).await;
        return;
    }

    let result = report_json(&plan, &conflicts, created, updated, skipped_conflicts);
    match BulkOperationRepo::complete(&state.pool, op_id, &result).await {
        Ok(true) => {
            tracing::info!(op_id, created, updated, skipped_conflicts, "Bulk operation completed");
            state.event_bus.publish(
                PlatformEvent::new("bulk_operation.completed")
                    .with_source("bulk_operation", op_id)
                    .with_actor(user_id)
                    .with_payload(result),
            );
        }
        Ok(false) => {
            // Cancelled between commit and the status flip; the mutations
            // stand (they were committed) but the record stays cancelled.
            tracing::warn!(op_id, "Bulk operation finished after cancellation flag");
        }
        Err(e) => {
            tracing::error!(op_id, error = %e, "Failed to mark bulk operation completed");
        }
    }
}

async fn is_cancelled(state: &AppState, op_id: DbId) -> bool {
    match BulkOperationRepo::is_cancelled(&state.pool, op_id).await {
        Ok(cancelled) => {
            if cancelled {
                tracing::info!(op_id, "Bulk operation cancelled between phases");
            }
            cancelled
        }
        Err(e) => {
            tracing::error!(op_id, error = %e, "Failed to read cancellation flag");
            false
        }
    }
}

async fn fail(state: &AppState, op_id: DbId, message: &str, result: Option<&serde_json::Value>) {
    tracing::error!(op_id, error = %message, "Bulk operation failed");
    if let Err(e) = BulkOperationRepo::fail(&state.pool, op_id, message, result).await {
        tracing::error!(op_id, error = %e, "Failed to mark bulk operation failed");
    }
    state.event_bus.publish(
        PlatformEvent::new("bulk_operation.failed")
            .with_source("bulk_operation", op_id)
            .with_payload(serde_json::json!({ "error": message })),
    );
}

fn report_json(
    plan: &Plan,
    conflicts: &ConflictReport,
    created: usize,
    updated: usize,
    skipped_conflicts: usize,
) -> serde_json::Value {
    serde_json::to_value(ExecutionReport {
        planned: plan.items.len(),
        created,
        updated,
        skipped_conflicts,
        pre_skipped: &plan.pre_skipped,
        warnings: &plan.warnings,
        conflicts,
    })
    .unwrap_or_else(|_| serde_json::json!({ "error": "report serialization failed" }))
}
