use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use studiosync_core::store::Store;

use crate::{ApiState, handlers::absences};

pub fn routes<S: Store>() -> Router<Arc<ApiState<S>>> {
    Router::new()
        .route("/api/absences", post(absences::report_absence::<S>))
        .route("/api/absences/:id", get(absences::get_absence::<S>))
        .route("/api/absences/:id/cancel", post(absences::cancel_absence::<S>))
        .route(
            "/api/absences/:id/substitute-requests",
            post(absences::create_substitute_requests::<S>),
        )
}
