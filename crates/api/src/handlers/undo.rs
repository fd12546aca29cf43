//! Handler for consuming undo ledger records.
//!
//! Restore handlers exist for timetable entries and holidays; any other
//! recorded entity type fails with an explicit unsupported error rather
//! than silently doing nothing. A consumed record is deleted, so undo is
//! exactly-once; an expired record is purged on contact.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use collegium_core::error::CoreError;
use collegium_core::types::DbId;
use collegium_core::undo;
use collegium_db::models::holiday::Holiday;
use collegium_db::models::timetable_entry::TimetableEntry;
use collegium_db::repositories::{HolidayRepo, TimetableEntryRepo, UndoRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload: what was restored.
#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub entity_type: String,
    pub entity_id: DbId,
    pub restored: serde_json::Value,
}

/// POST /api/v1/undo/{id}
///
/// Consume one ledger record: re-create the entity from its snapshot
/// under its original id, then delete the record. Records owned by a
/// different requester read as not found.
pub async fn undo(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = UndoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "UndoOperation",
            id,
        })?;

    // Another requester's ledger entry is indistinguishable from a
    // missing one.
    if record.requested_by != user.user_id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "UndoOperation",
            id,
        }));
    }

    if chrono::Utc::now() > record.expires_at {
        UndoRepo::delete(&state.pool, id).await?;
        return Err(AppError::Core(CoreError::Expired(format!(
            "undo record {id} expired at {}",
            record.expires_at
        ))));
    }

    undo::validate_restorable(&record.entity_type)?;

    let restored = match record.entity_type.as_str() {
        "timetable_entry" => {
            let snapshot: TimetableEntry =
                serde_json::from_value(record.snapshot.clone()).map_err(|e| {
                    AppError::InternalError(format!("corrupt entry snapshot: {e}"))
                })?;
            let entry = TimetableEntryRepo::restore_from_snapshot(&state.pool, &snapshot).await?;
            serde_json::to_value(entry)
                .map_err(|e| AppError::InternalError(format!("restore serialization: {e}")))?
        }
        "holiday" => {
            let snapshot: Holiday = serde_json::from_value(record.snapshot.clone())
                .map_err(|e| AppError::InternalError(format!("corrupt holiday snapshot: {e}")))?;
            let holiday = HolidayRepo::restore_from_snapshot(&state.pool, &snapshot).await?;
            serde_json::to_value(holiday)
                .map_err(|e| AppError::InternalError(format!("restore serialization: {e}")))?
        }
        // validate_restorable() already rejected everything else.
        other => {
            return Err(AppError::InternalError(format!(
                "restorable entity type '{other}' has no handler"
            )))
        }
    };

    UndoRepo::delete(&state.pool, id).await?;

    tracing::info!(
        undo_id = id,
        entity_type = %record.entity_type,
        entity_id = record.entity_id,
        user_id = user.user_id,
        "Undo applied",
    );

    Ok(Json(DataResponse {
        data: UndoResponse {
            entity_type: record.entity_type,
            entity_id: record.entity_id,
            restored,
        },
    }))
}
