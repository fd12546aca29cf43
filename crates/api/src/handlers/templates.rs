//! Handlers for `/timetable/templates`, including the pure preview
//! endpoint (expansion + conflict report, zero writes).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use collegium_core::conflict::ConflictReport;
use collegium_core::error::CoreError;
use collegium_core::recurrence::{self, Expansion};
use collegium_core::timetable::DayOfWeek;
use collegium_core::types::DbId;
use collegium_db::models::template::CreateTimetableTemplate;
use collegium_db::repositories::{
    BatchRepo, FacultyRepo, SubjectRepo, TemplateRepo, TimeSlotRepo,
};

use crate::engine::{detector, facts};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/timetable/templates
///
/// A template that could never expand is rejected here, not at apply
/// time.
pub async fn create_template(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTimetableTemplate>,
) -> AppResult<impl IntoResponse> {
    DayOfWeek::from_i16(input.day_of_week)?;
    recurrence::RecurrencePattern::parse(&input.recurrence_pattern)?;
    let end_condition = recurrence::EndCondition::parse(&input.end_condition)?;

    // End-condition field combinations, checked before the insert so the
    // caller gets a structured message instead of a CHECK violation.
    match end_condition {
        recurrence::EndCondition::HoursComplete => {
            if !input.total_hours.is_some_and(|h| h > 0.0) {
                return Err(AppError::Core(CoreError::Validation(
                    "end_condition hours_complete requires a positive total_hours".into(),
                )));
            }
        }
        recurrence::EndCondition::SpecificDate => {
            if input.end_date.is_none() {
                return Err(AppError::Core(CoreError::Validation(
                    "end_condition specific_date requires an end_date".into(),
                )));
            }
        }
        recurrence::EndCondition::SemesterEnd => {}
    }

    BatchRepo::find_by_id(&state.pool, input.batch_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Batch",
            id: input.batch_id,
        })?;
    SubjectRepo::find_by_id(&state.pool, input.subject_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subject",
            id: input.subject_id,
        })?;
    FacultyRepo::find_by_id(&state.pool, input.faculty_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Faculty",
            id: input.faculty_id,
        })?;
    TimeSlotRepo::find_by_id(&state.pool, input.time_slot_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimeSlot",
            id: input.time_slot_id,
        })?;

    let template = TemplateRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/v1/timetable/templates
pub async fn list_templates(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/timetable/templates/{id}
pub async fn get_template(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableTemplate",
            id,
        })?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/timetable/templates/{id}
///
/// Deactivates the template; entries it generated are independent and
/// survive.
pub async fn delete_template(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deactivated = TemplateRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimetableTemplate",
            id,
        }));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "deactivated": true }),
    }))
}

/// Preview payload: the expansion plus the conflict report its drafts
/// would produce right now.
#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub expansion: Expansion,
    pub conflicts: ConflictReport,
}

/// POST /api/v1/timetable/templates/{id}/preview
///
/// Pure read: expands the template against its own batch and runs
/// conflict detection on the drafts. Nothing is persisted.
pub async fn preview_template(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimetableTemplate",
            id,
        })?;
    let slot = TimeSlotRepo::find_by_id(&state.pool, template.time_slot_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TimeSlot",
            id: template.time_slot_id,
        })?;
    let batch = BatchRepo::find_by_id(&state.pool, template.batch_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Batch",
            id: template.batch_id,
        })?;

    let calendar = facts::load(&state.pool).await?;
    let rule = template.to_rule(slot.duration_minutes, None)?;
    let expansion = recurrence::expand(&rule, &calendar, batch.department_id)?;

    if expansion.cap_reached {
        tracing::warn!(
            template_id = template.id,
            "Template preview hit the generation cap; check its end condition",
        );
    }

    let conflicts = if expansion.drafts.is_empty() {
        ConflictReport {
            entries: Vec::new(),
            has_errors: false,
            has_warnings: false,
        }
    } else {
        let departments =
            std::collections::HashMap::from([(batch.id, batch.department_id)]);
        detector::detect(&state.pool, &expansion.drafts, &departments, &[]).await?
    };

    Ok(Json(DataResponse {
        data: TemplatePreview {
            expansion,
            conflicts,
        },
    }))
}
