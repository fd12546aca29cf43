//! Route tree for the `/api/v1` prefix.

pub mod bulk;
pub mod entries;
pub mod exam_periods;
pub mod health;
pub mod holidays;
pub mod templates;
pub mod time_slots;
pub mod undo;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /time-slots                                  list, create
/// /time-slots/{id}                             deactivate
///
/// /holidays                                    list, create
/// /holidays/{id}                               delete (records undo)
/// /exam-periods                                list, create
/// /exam-periods/{id}                           delete
///
/// /timetable/entries                           list, create (validated)
/// /timetable/entries/{id}                      get, patch, delete (records undo)
///
/// /timetable/templates                         list, create
/// /timetable/templates/{id}                    get, delete
/// /timetable/templates/{id}/preview            pure expansion preview (POST)
///
/// /timetable/bulk/clone                        submit (POST)
/// /timetable/bulk/faculty-replace              submit (POST)
/// /timetable/bulk/reschedule                   submit (POST)
/// /timetable/bulk/template-apply               submit (POST)
/// /timetable/bulk/operations                   list
/// /timetable/bulk/operations/{id}              status poll
/// /timetable/bulk/operations/{id}/cancel       cooperative cancel (POST)
///
/// /undo/{id}                                   consume a ledger record (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/time-slots", time_slots::router())
        .nest("/holidays", holidays::router())
        .nest("/exam-periods", exam_periods::router())
        .nest("/timetable/entries", entries::router())
        .nest("/timetable/templates", templates::router())
        .nest("/timetable/bulk", bulk::router())
        .nest("/undo", undo::router())
}
