use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use studiosync_core::{
    coverage,
    models::{
        absence::{AbsenceOverview, ReportAbsenceRequest, ReportAbsenceResponse, TeacherAbsence},
        substitute::{CreateSubstituteRequests, SubstituteRequest},
    },
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

pub async fn report_absence<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    AppJson(payload): AppJson<ReportAbsenceRequest>,
) -> Result<(StatusCode, Json<ReportAbsenceResponse>), AppError> {
    let response = coverage::report_absence(&state.store, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The absence with its coverage status derived from its requests.
pub async fn get_absence<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AbsenceOverview>, AppError> {
    Ok(Json(coverage::absence_overview(&state.store, id).await?))
}

pub async fn cancel_absence<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<TeacherAbsence>, AppError> {
    let absence =
        coverage::cancel_absence(&state.store, state.notifier.as_ref(), &actor, id).await?;
    Ok(Json(absence))
}

pub async fn create_substitute_requests<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateSubstituteRequests>,
) -> Result<(StatusCode, Json<Vec<SubstituteRequest>>), AppError> {
    let requests = coverage::create_substitute_requests(
        &state.store,
        state.notifier.as_ref(),
        &actor,
        id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(requests)))
}
