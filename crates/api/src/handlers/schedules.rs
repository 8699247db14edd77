use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use studiosync_core::{
    models::schedule::{
        CreateScheduleResponse, GenerateLessonsRequest, GenerationReport, NewSchedule,
        RecurringSchedule, ScheduleUpdate,
    },
    schedules,
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

/// Creates the schedule and materializes its first weeks of lessons.
pub async fn create_schedule<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    AppJson(payload): AppJson<NewSchedule>,
) -> Result<(StatusCode, Json<CreateScheduleResponse>), AppError> {
    let today = Utc::now().date_naive();
    let response =
        schedules::create_schedule(&state.store, &actor, &state.scheduling, today, payload)
            .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_schedule<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecurringSchedule>, AppError> {
    Ok(Json(schedules::get_schedule(&state.store, id).await?))
}

pub async fn update_schedule<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ScheduleUpdate>,
) -> Result<Json<RecurringSchedule>, AppError> {
    let schedule = schedules::update_schedule(&state.store, &actor, id, payload).await?;
    Ok(Json(schedule))
}

pub async fn deactivate_schedule<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<RecurringSchedule>, AppError> {
    let schedule = schedules::deactivate_schedule(&state.store, &actor, id).await?;
    Ok(Json(schedule))
}

pub async fn generate_lessons<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<GenerateLessonsRequest>,
) -> Result<Json<GenerationReport>, AppError> {
    let report = schedules::generate_for_schedule(
        &state.store,
        &actor,
        &state.scheduling,
        id,
        payload.from,
        payload.until,
    )
    .await?;
    Ok(Json(report))
}
