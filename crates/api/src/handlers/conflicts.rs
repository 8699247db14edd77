use axum::{Json, extract::State};
use std::sync::Arc;
use studiosync_core::{
    conflict,
    models::lesson::{ConflictQuery, ConflictQueryResponse},
    store::Store,
    time::TimeRange,
};

use crate::{
    ApiState,
    middleware::error_handling::{AppError, AppQuery},
};

/// Read-only lane check used by booking forms before they submit.
pub async fn check_conflict<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    AppQuery(query): AppQuery<ConflictQuery>,
) -> Result<Json<ConflictQueryResponse>, AppError> {
    let range = TimeRange::new(query.start_time, query.end_time)?;
    let found = conflict::conflicting_lesson(
        &state.store,
        query.kind,
        query.resource_id,
        query.date,
        &range,
        query.exclude_id,
    )
    .await?;

    Ok(Json(ConflictQueryResponse {
        conflict: found.is_some(),
        conflicting_lesson_id: found.map(|lesson| lesson.id),
    }))
}
