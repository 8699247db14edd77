use axum::{Router, routing::post};
use std::sync::Arc;
use studiosync_core::store::Store;

use crate::{ApiState, handlers::substitutes};

pub fn routes<S: Store>() -> Router<Arc<ApiState<S>>> {
    Router::new().route(
        "/api/substitute-requests/:id/respond",
        post(substitutes::respond::<S>),
    )
}
