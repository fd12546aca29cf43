//! Route definitions for `/exam-periods`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::exam_periods;
use crate::state::AppState;

/// Routes mounted at `/exam-periods`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(exam_periods::list_exam_periods).post(exam_periods::create_exam_period),
        )
        .route("/{id}", delete(exam_periods::delete_exam_period))
}
