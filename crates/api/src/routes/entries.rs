//! Route definitions for `/timetable/entries`.

use axum::routing::get;
use axum::Router;

use crate::handlers::entries;
use crate::state::AppState;

/// Routes mounted at `/timetable/entries`.
///
/// ```text
/// GET    /         -> list_entries
/// POST   /         -> create_entries (single or bulk, conflict-checked)
/// GET    /{id}     -> get_entry
/// PATCH  /{id}     -> update_entry
/// DELETE /{id}     -> delete_entry (soft, records undo)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(entries::list_entries).post(entries::create_entries))
        .route(
            "/{id}",
            get(entries::get_entry)
                .patch(entries::update_entry)
                .delete(entries::delete_entry),
        )
}
