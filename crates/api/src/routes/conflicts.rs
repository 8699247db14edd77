use axum::{Router, routing::get};
use std::sync::Arc;
use studiosync_core::store::Store;

use crate::{ApiState, handlers};

pub fn routes<S: Store>() -> Router<Arc<ApiState<S>>> {
    Router::new().route("/api/conflicts", get(handlers::conflicts::check_conflict::<S>))
}
