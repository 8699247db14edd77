//! # Error Handling Middleware
//!
//! Maps [`StudioError`] onto HTTP status codes and JSON error bodies so every
//! handler reports failures the same way. Conflicts additionally carry the
//! structured `conflict` object, which names the lane and the booking that
//! blocked the request.
//!
//! [`AppJson`] and [`AppQuery`] replace axum's extractors so malformed input
//! is reported as a validation error in the same JSON shape.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use studiosync_core::errors::StudioError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on any
/// `StudioResult`.
///
/// ```
/// use axum::Json;
/// use studiosync_api::middleware::error_handling::AppError;
/// use studiosync_core::errors::StudioError;
///
/// async fn handler(name: Option<String>) -> Result<Json<String>, AppError> {
///     let name = name.ok_or_else(|| StudioError::Validation("name is required".to_string()))?;
///     Ok(Json(name))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub StudioError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::Validation(_) => StatusCode::BAD_REQUEST,
            StudioError::Forbidden(_) => StatusCode::FORBIDDEN,
            StudioError::Conflict(_) => StatusCode::CONFLICT,
            StudioError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StudioError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = match &self.0 {
            StudioError::Conflict(conflict) => json!({ "error": message, "conflict": conflict }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StudioError> for AppError {
    fn from(err: StudioError) -> Self {
        AppError(err)
    }
}

/// Storage errors go through [`StudioError`]'s own conversion so lost
/// serialization races still surface as conflicts.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(StudioError::from(err))
    }
}

/// JSON body extractor whose rejection is a `400` validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejection is a `400` validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(StudioError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(StudioError::Validation(rejection.body_text()))
    }
}

/// Maps a StudioError to an HTTP response
pub fn map_error(err: StudioError) -> Response {
    AppError(err).into_response()
}
