//! Route definitions for `/timetable/templates`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/timetable/templates`.
///
/// ```text
/// GET    /               -> list_templates
/// POST   /               -> create_template
/// GET    /{id}           -> get_template
/// DELETE /{id}           -> delete_template (deactivate)
/// POST   /{id}/preview   -> preview_template (pure, zero writes)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/{id}",
            get(templates::get_template).delete(templates::delete_template),
        )
        .route("/{id}/preview", post(templates::preview_template))
}
