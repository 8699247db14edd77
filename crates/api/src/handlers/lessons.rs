use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use studiosync_core::{
    booking,
    coverage::{self, ByCompletedLessons, Candidate},
    models::lesson::{BulkCancelRequest, CancelLessonRequest, Lesson, LessonUpdate, NewLesson},
    store::Store,
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::CurrentActor,
        error_handling::{AppError, AppJson},
    },
};

pub async fn book_lesson<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    AppJson(payload): AppJson<NewLesson>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = booking::book_lesson(&state.store, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn get_lesson<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lesson>, AppError> {
    Ok(Json(booking::get_lesson(&state.store, id).await?))
}

pub async fn update_lesson<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<LessonUpdate>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = booking::update_lesson(&state.store, &actor, id, payload).await?;
    Ok(Json(lesson))
}

pub async fn cancel_lesson<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CancelLessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = booking::cancel_lesson(&state.store, &actor, id, payload.reason).await?;
    Ok(Json(lesson))
}

pub async fn bulk_cancel<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    AppJson(payload): AppJson<BulkCancelRequest>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let cancelled = booking::bulk_cancel(&state.store, &actor, payload).await?;
    Ok(Json(cancelled))
}

/// Substitute candidates for a lesson, most experienced first.
pub async fn find_candidates<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    let candidates = coverage::find_candidates(&state.store, id, &ByCompletedLessons).await?;
    Ok(Json(candidates))
}
