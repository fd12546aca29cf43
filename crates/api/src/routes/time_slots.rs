//! Route definitions for `/time-slots`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::time_slots;
use crate::state::AppState;

/// Routes mounted at `/time-slots`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(time_slots::list_time_slots).post(time_slots::create_time_slot),
        )
        .route("/{id}", delete(time_slots::deactivate_time_slot))
}
