//! Handlers for `/holidays`. Deletion records an undo ledger snapshot;
//! holidays are one of the two entity types with a first-class restore
//! handler.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use collegium_core::calendar::HolidayType;
use collegium_core::error::CoreError;
use collegium_core::types::{DbId, Timestamp};
use collegium_core::undo;
use collegium_db::models::holiday::{CreateHoliday, Holiday};
use collegium_db::repositories::{HolidayRepo, UndoRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/holidays
pub async fn create_holiday(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHoliday>,
) -> AppResult<impl IntoResponse> {
    let known_types = [
        HolidayType::National.as_str(),
        HolidayType::University.as_str(),
        HolidayType::Department.as_str(),
        HolidayType::Local.as_str(),
    ];
    if !known_types.contains(&input.holiday_type.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "unknown holiday_type '{}'",
            input.holiday_type
        ))));
    }
    if input.holiday_type == HolidayType::Department.as_str() && input.department_id.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "department holidays require a department_id".into(),
        )));
    }
    let holiday = HolidayRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: holiday })))
}

/// GET /api/v1/holidays
pub async fn list_holidays(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let holidays = HolidayRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: holidays }))
}

/// Query parameters for deletion: optional undo TTL.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub ttl_secs: Option<i64>,
}

/// Response payload for deletion.
#[derive(Debug, Serialize)]
pub struct DeleteHolidayResponse {
    pub holiday: Holiday,
    pub undo_id: DbId,
    pub undo_expires_at: Timestamp,
}

/// DELETE /api/v1/holidays/{id}
pub async fn delete_holiday(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let holiday = HolidayRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Holiday",
            id,
        })?;

    let ttl = undo::clamp_ttl(params.ttl_secs);
    let expires_at = chrono::Utc::now() + Duration::seconds(ttl);
    let snapshot = serde_json::to_value(&holiday)
        .map_err(|e| AppError::InternalError(format!("snapshot serialization failed: {e}")))?;
    let metadata = serde_json::json!({
        "name": holiday.name,
        "holiday_date": holiday.holiday_date,
    });

    let record = UndoRepo::create(
        &state.pool,
        "holiday",
        holiday.id,
        &snapshot,
        &metadata,
        user.user_id,
        expires_at,
    )
    .await?;

    tracing::info!(
        holiday_id = holiday.id,
        undo_id = record.id,
        user_id = user.user_id,
        "Holiday deleted",
    );

    Ok(Json(DataResponse {
        data: DeleteHolidayResponse {
            holiday,
            undo_id: record.id,
            undo_expires_at: record.expires_at,
        },
    }))
}
