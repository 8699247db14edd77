use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use studiosync_core::{
    coverage,
    models::substitute::{RespondRequest, SubstituteRequest},
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

/// Approve or decline a substitute request. A losing approval gets 409.
pub async fn respond<S: Store>(
    State(state): State<Arc<ApiState<S>>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RespondRequest>,
) -> Result<Json<SubstituteRequest>, AppError> {
    let request =
        coverage::respond(&state.store, state.notifier.as_ref(), &actor, id, payload).await?;
    Ok(Json(request))
}
