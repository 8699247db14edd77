use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use studiosync_core::store::Store;

use crate::{ApiState, handlers::lessons};

pub fn routes<S: Store>() -> Router<Arc<ApiState<S>>> {
    Router::new()
        .route("/api/lessons", post(lessons::book_lesson::<S>))
        .route("/api/lessons/bulk-cancel", post(lessons::bulk_cancel::<S>))
        .route(
            "/api/lessons/:id",
            get(lessons::get_lesson::<S>).put(lessons::update_lesson::<S>),
        )
        .route("/api/lessons/:id/cancel", post(lessons::cancel_lesson::<S>))
        .route("/api/lessons/:id/candidates", get(lessons::find_candidates::<S>))
}
