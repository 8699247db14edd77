use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use studiosync_core::store::Store;

use crate::{ApiState, handlers::schedules};

pub fn routes<S: Store>() -> Router<Arc<ApiState<S>>> {
    Router::new()
        .route("/api/schedules", post(schedules::create_schedule::<S>))
        .route(
            "/api/schedules/:id",
            get(schedules::get_schedule::<S>).put(schedules::update_schedule::<S>),
        )
        .route(
            "/api/schedules/:id/deactivate",
            post(schedules::deactivate_schedule::<S>),
        )
        .route(
            "/api/schedules/:id/generate",
            post(schedules::generate_lessons::<S>),
        )
}
