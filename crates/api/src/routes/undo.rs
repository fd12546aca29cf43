//! Route definitions for `/undo`.

use axum::routing::post;
use axum::Router;

use crate::handlers::undo;
use crate::state::AppState;

/// Routes mounted at `/undo`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", post(undo::undo))
}
