//! Route definitions for `/holidays`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::holidays;
use crate::state::AppState;

/// Routes mounted at `/holidays`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(holidays::list_holidays).post(holidays::create_holiday),
        )
        .route("/{id}", delete(holidays::delete_holiday))
}
