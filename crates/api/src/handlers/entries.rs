//! Handlers for `/timetable/entries`.
//!
//! Creation always runs through the conflict detector -- there is no
//! direct-insert path into the entry store. Deletion is a soft
//! deactivation that records an undo ledger snapshot.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use collegium_core::conflict::ConflictReport;
use collegium_core::error::CoreError;
use collegium_core::timetable::EntryDraft;
use collegium_core::types::{DbId, Timestamp};
use collegium_core::undo;
use collegium_db::models::timetable_entry::{
    CreateTimetableEntry, EntryListQuery, TimetableEntry, UpdateTimetableEntry,
};
use collegium_db::repositories::{
    BatchRepo, FacultyRepo, SubjectRepo, TimeSlotRepo, TimetableEntryRepo, UndoRepo,
};
use collegium_events::PlatformEvent;

use crate::engine::detector;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Body for `POST /timetable/entries`: one or more proposed entries.
#[derive(Debug, Deserialize)]
pub struct CreateEntriesRequest {
    pub entries: Vec<EntryDraft>,
    /// Run validation and conflict detection only; persist nothing.
    #[serde(default)]
    pub validate_only: bool,
}

/// Response payload for entry creation.
#[derive(Debug, Serialize)]
pub struct CreateEntriesResponse {
    pub entries: Vec<TimetableEntry>,
    pub conflicts: ConflictReport,
}

/// POST /api/v1/timetable/entries
///
/// Create entries (single or bulk) after reference validation and
/// conflict detection. Any error-severity conflict rejects the whole
/// request with the full report; warnings never block.
pub async fn create_entries(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEntriesRequest>,
) -> AppResult<impl IntoResponse> {
    if input.entries.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "entries must be non-empty".into(),
        )));
    }

    validate_references(&state, &input.entries).await?;

    let mut batch_ids: Vec<DbId> = input.entries.iter().map(|e| e.batch_id).collect();
    batch_ids.sort_unstable();
    batch_ids.dedup();
    let departments = BatchRepo::department_map(&state.pool, &batch_ids).await?;

    let report = detector::detect(&state.pool, &input.entries, &departments, &[]).await?;

    if input.validate_only {
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: CreateEntriesResponse {
                    entries: Vec::new(),
                    conflicts: report,
                },
            }),
        ));
    }

    if report.has_errors {
        state.event_bus.publish(
            PlatformEvent::new("timetable.conflicts_detected")
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({ "conflicts": &report })),
        );
        return Err(AppError::ScheduleConflict(Box::new(report)));
    }

    let mut tx = state.pool.begin().await?;
    let mut created = Vec::with_capacity(input.entries.len());
    for draft in &input.entries {
        let row = TimetableEntryRepo::create_in_tx(
            &mut tx,
            &CreateTimetableEntry::from_draft(draft, Some(user.user_id)),
        )
        .await?;
        created.push(row);
    }
    tx.commit().await?;

    tracing::info!(
        count = created.len(),
        user_id = user.user_id,
        "Timetable entries created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateEntriesResponse {
                entries: created,
                conflicts: report,
            },
        }),
    ))
}

/// Reference checks shared by entry creation: every batch, subject,
/// faculty member, and time slot must resolve to an active row.
async fn validate_references(state: &AppState, drafts: &[EntryDraft]) -> AppResult<()> {
    let mut batch_ids: Vec<DbId> = drafts.iter().map(|d| d.batch_id).collect();
    batch_ids.sort_unstable();
    batch_ids.dedup();
    let missing = BatchRepo::missing_ids(&state.pool, &batch_ids).await?;
    if let Some(&id) = missing.first() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Batch", id }));
    }

    let mut subject_ids: Vec<DbId> = drafts.iter().filter_map(|d| d.kind.subject_id()).collect();
    subject_ids.sort_unstable();
    subject_ids.dedup();
    for id in subject_ids {
        SubjectRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Subject",
                id,
            })?;
    }

    let mut faculty_ids: Vec<DbId> = drafts.iter().filter_map(|d| d.kind.faculty_id()).collect();
    faculty_ids.sort_unstable();
    faculty_ids.dedup();
    for id in faculty_ids {
        FacultyRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Faculty",
                id,
            })?;
    }

    let mut slot_ids: Vec<DbId> = drafts.iter().map(|d| d.time_slot_id).collect();
    slot_ids.sort_unstable();
    slot_ids.dedup();
    for id in slot_ids {
        let slot = TimeSlotRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "TimeSlot",
                id,
            })?;
        if !slot.is_active {
            return Err(AppError::Core(CoreError::Validation(format!(
                "time slot {id} is deactivated"
            ))));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/timetable/entries
pub async fn list_entries(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(q): Query<EntryListQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = TimetableEntryRepo::list(&state.pool, &q).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/timetable/entries/{id}
pub async fn get_entry(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = TimetableEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableEntry",
            id,
        })?;
    Ok(Json(DataResponse { data: entry }))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PATCH /api/v1/timetable/entries/{id}
///
/// Notes and entry type only. Moving an entry between slots or dates is
/// a reschedule concern so it cannot dodge conflict detection.
pub async fn update_entry(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimetableEntry>,
) -> AppResult<impl IntoResponse> {
    if let Some(entry_type) = &input.entry_type {
        collegium_core::timetable::EntryType::parse(entry_type)?;
    }
    let entry = TimetableEntryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableEntry",
            id,
        })?;
    Ok(Json(DataResponse { data: entry }))
}

// ---------------------------------------------------------------------------
// Delete (+ undo snapshot)
// ---------------------------------------------------------------------------

/// Query parameters for deletion: optional undo TTL.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub ttl_secs: Option<i64>,
}

/// Response payload for deletion: the deactivated entry plus the ledger
/// handle needed to reverse it.
#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub entry: TimetableEntry,
    pub undo_id: DbId,
    pub undo_expires_at: Timestamp,
}

/// DELETE /api/v1/timetable/entries/{id}
///
/// Soft-deactivate the entry and record a full snapshot in the undo
/// ledger. The TTL is caller-chosen, capped at five minutes.
pub async fn delete_entry(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let entry = TimetableEntryRepo::deactivate(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableEntry",
            id,
        })?;

    let ttl = undo::clamp_ttl(params.ttl_secs);
    let expires_at = chrono::Utc::now() + Duration::seconds(ttl);
    let snapshot = serde_json::to_value(&entry)
        .map_err(|e| AppError::InternalError(format!("snapshot serialization failed: {e}")))?;
    let metadata = serde_json::json!({
        "batch_id": entry.batch_id,
        "time_slot_id": entry.time_slot_id,
        "day_of_week": entry.day_of_week,
        "entry_date": entry.entry_date,
    });

    let record = UndoRepo::create(
        &state.pool,
        "timetable_entry",
        entry.id,
        &snapshot,
        &metadata,
        user.user_id,
        expires_at,
    )
    .await?;

    tracing::info!(
        entry_id = entry.id,
        undo_id = record.id,
        ttl_secs = ttl,
        user_id = user.user_id,
        "Timetable entry deactivated",
    );

    Ok(Json(DataResponse {
        data: DeleteEntryResponse {
            entry,
            undo_id: record.id,
            undo_expires_at: record.expires_at,
        },
    }))
}
