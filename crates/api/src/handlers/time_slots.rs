//! Handlers for `/time-slots`.
//!
//! Slots referenced by entries are never hard-deleted; the delete
//! endpoint deactivates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use collegium_core::error::CoreError;
use collegium_core::types::DbId;
use collegium_db::models::time_slot::CreateTimeSlot;
use collegium_db::repositories::{TimeSlotRepo, TimetableEntryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/time-slots
pub async fn create_time_slot(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTimeSlot>,
) -> AppResult<impl IntoResponse> {
    if input.end_time <= input.start_time {
        return Err(AppError::Core(CoreError::Validation(
            "end_time must be after start_time".into(),
        )));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    let slot = TimeSlotRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// GET /api/v1/time-slots
pub async fn list_time_slots(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let slots = TimeSlotRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// DELETE /api/v1/time-slots/{id}
///
/// Deactivates the slot. Slots with entries (even inactive ones) stay in
/// the schema so those entries keep resolving; deactivation just removes
/// the slot from new scheduling.
pub async fn deactivate_time_slot(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let referenced = TimetableEntryRepo::any_for_time_slot(&state.pool, id).await?;
    let deactivated = TimeSlotRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimeSlot",
            id,
        }));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({
            "deactivated": true,
            "referenced_by_entries": referenced,
        }),
    }))
}
