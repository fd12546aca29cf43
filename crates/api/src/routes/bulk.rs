//! Route definitions for `/timetable/bulk`.
//!
//! The four submission endpoints are the only entry points into the bulk
//! engine; all of them accept the shared options bag (`dry_run`,
//! `conflict_policy`, `exclude_weekends`, `respect_blackouts`).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bulk;
use crate::state::AppState;

/// Routes mounted at `/timetable/bulk`.
///
/// ```text
/// POST /clone                      -> clone_schedule
/// POST /faculty-replace            -> replace_faculty
/// POST /reschedule                 -> reschedule_entries
/// POST /template-apply             -> apply_template
/// GET  /operations                 -> list_operations
/// GET  /operations/{id}            -> get_operation
/// POST /operations/{id}/cancel     -> cancel_operation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clone", post(bulk::clone_schedule))
        .route("/faculty-replace", post(bulk::replace_faculty))
        .route("/reschedule", post(bulk::reschedule_entries))
        .route("/template-apply", post(bulk::apply_template))
        .route("/operations", get(bulk::list_operations))
        .route("/operations/{id}", get(bulk::get_operation))
        .route("/operations/{id}/cancel", post(bulk::cancel_operation))
}
