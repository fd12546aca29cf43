//! Handlers for the four bulk operation kinds plus operation tracking.
//!
//! Submission is fire-and-track: planning and validation run
//! synchronously (parameter and reference failures are immediate 4xx),
//! then a pending `bulk_operations` record is created and execution is
//! spawned. `dry_run` short-circuits with the full projection and
//! conflict report and never creates a record -- it is the preview path.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use collegium_core::bulk::{BulkOptions, BulkStatus, OperationKind};
use collegium_core::error::CoreError;
use collegium_core::reschedule::Exclusions;
use collegium_core::types::DbId;
use collegium_db::repositories::BulkOperationRepo;

use crate::engine::clone::{self, CloneParams};
use crate::engine::executor;
use crate::engine::faculty_replace::{self, FacultyReplaceParams};
use crate::engine::plan::Plan;
use crate::engine::reschedule::{self, RescheduleParams};
use crate::engine::template_apply::{self, TemplateApplyParams};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request envelope shared by all four kinds: the kind's parameters at
/// the top level plus an optional options bag.
#[derive(Debug, Deserialize)]
pub struct BulkRequest<P> {
    #[serde(flatten)]
    pub params: P,
    #[serde(default)]
    pub options: BulkOptions,
}

/// POST /api/v1/timetable/bulk/clone
pub async fn clone_schedule(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest<CloneParams>>,
) -> AppResult<impl IntoResponse> {
    let plan = clone::plan(&state.pool, &req.params).await?;
    let parameters = to_parameters(&req.params)?;
    submit(state, OperationKind::Clone, parameters, plan, req.options, user).await
}

/// POST /api/v1/timetable/bulk/faculty-replace
pub async fn replace_faculty(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest<FacultyReplaceParams>>,
) -> AppResult<impl IntoResponse> {
    let plan = faculty_replace::plan(&state.pool, &req.params).await?;
    let parameters = to_parameters(&req.params)?;
    submit(
        state,
        OperationKind::FacultyReplace,
        parameters,
        plan,
        req.options,
        user,
    )
    .await
}

/// POST /api/v1/timetable/bulk/reschedule
pub async fn reschedule_entries(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest<RescheduleParams>>,
) -> AppResult<impl IntoResponse> {
    let exclusions = Exclusions {
        exclude_weekends: req.options.exclude_weekends,
        respect_blackouts: req.options.respect_blackouts,
    };
    let plan = reschedule::plan(&state.pool, &req.params, exclusions).await?;
    let parameters = to_parameters(&req.params)?;
    submit(
        state,
        OperationKind::Reschedule,
        parameters,
        plan,
        req.options,
        user,
    )
    .await
}

/// POST /api/v1/timetable/bulk/template-apply
pub async fn apply_template(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest<TemplateApplyParams>>,
) -> AppResult<impl IntoResponse> {
    let plan = template_apply::plan(&state.pool, &req.params).await?;
    let parameters = to_parameters(&req.params)?;
    submit(
        state,
        OperationKind::TemplateApply,
        parameters,
        plan,
        req.options,
        user,
    )
    .await
}

fn to_parameters<P: serde::Serialize>(params: &P) -> AppResult<serde_json::Value> {
    serde_json::to_value(params)
        .map_err(|e| AppError::InternalError(format!("parameter serialization failed: {e}")))
}

/// Shared tail of every submission: dry-run short-circuit, or record +
/// spawn.
async fn submit(
    state: AppState,
    kind: OperationKind,
    parameters: serde_json::Value,
    plan: Plan,
    options: BulkOptions,
    user: AuthUser,
) -> AppResult<axum::response::Response> {
    if options.dry_run {
        let report = executor::dry_run(&state, plan).await?;
        return Ok(Json(DataResponse { data: report }).into_response());
    }

    let operation =
        BulkOperationRepo::create(&state.pool, kind, user.user_id, &parameters).await?;

    tracing::info!(
        op_id = operation.id,
        kind = kind.as_str(),
        items = plan.items.len(),
        user_id = user.user_id,
        "Bulk operation submitted",
    );

    let task_state = state.clone();
    let op_id = operation.id;
    let user_id = user.user_id;
    tokio::spawn(async move {
        executor::run(task_state, op_id, plan, options, user_id).await;
    });

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: operation })).into_response())
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

/// Query parameters for listing operations. Flat because
/// `serde_urlencoded` cannot drive numeric fields through `flatten`.
#[derive(Debug, Deserialize)]
pub struct OperationListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/timetable/bulk/operations
pub async fn list_operations(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(q): Query<OperationListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = q.status.as_deref().map(BulkStatus::parse).transpose()?;
    let (limit, offset) = PaginationParams {
        limit: q.limit,
        offset: q.offset,
    }
    .clamped();
    let operations = BulkOperationRepo::list(&state.pool, status, limit, offset).await?;
    Ok(Json(DataResponse { data: operations }))
}

/// GET /api/v1/timetable/bulk/operations/{id}
pub async fn get_operation(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let operation = BulkOperationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "BulkOperation",
            id,
        })?;
    Ok(Json(DataResponse { data: operation }))
}

/// POST /api/v1/timetable/bulk/operations/{id}/cancel
///
/// Cooperative: flips the status; the executor notices between phases.
/// Terminal operations cannot be cancelled.
pub async fn cancel_operation(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match BulkOperationRepo::cancel(&state.pool, id).await? {
        Some(operation) => {
            tracing::info!(op_id = id, user_id = user.user_id, "Bulk operation cancelled");
            Ok(Json(DataResponse { data: operation }))
        }
        None => match BulkOperationRepo::find_by_id(&state.pool, id).await? {
            Some(operation) => Err(AppError::Core(CoreError::Conflict(format!(
                "operation {id} is already {}",
                operation.status
            )))),
            None => Err(AppError::Core(CoreError::NotFound {
                entity: "BulkOperation",
                id,
            })),
        },
    }
}
