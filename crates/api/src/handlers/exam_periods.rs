//! Handlers for `/exam-periods`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use collegium_core::error::CoreError;
use collegium_core::types::DbId;
use collegium_db::models::exam_period::CreateExamPeriod;
use collegium_db::repositories::ExamPeriodRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/exam-periods
pub async fn create_exam_period(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateExamPeriod>,
) -> AppResult<impl IntoResponse> {
    if input.end_date < input.start_date {
        return Err(AppError::Core(CoreError::Validation(format!(
            "end_date {} precedes start_date {}",
            input.end_date, input.start_date
        ))));
    }
    let period = ExamPeriodRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: period })))
}

/// GET /api/v1/exam-periods
pub async fn list_exam_periods(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let periods = ExamPeriodRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: periods }))
}

/// DELETE /api/v1/exam-periods/{id}
pub async fn delete_exam_period(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ExamPeriodRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ExamPeriod",
            id,
        }));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": true }),
    }))
}
