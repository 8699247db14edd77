//! # Actor Extraction
//!
//! Identity is established upstream; this service trusts the
//! `x-actor-id` and `x-actor-role` headers and turns them into an [`Actor`]
//! for the core's permission checks.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use studiosync_core::errors::StudioError;
use studiosync_core::models::people::{Actor, ActorRole};
use uuid::Uuid;

use super::error_handling::AppError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The caller of the current request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
            .map(CurrentActor)
            .map_err(AppError)
    }
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, StudioError> {
    let user_id = header_value(headers, ACTOR_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| StudioError::Forbidden(format!("{ACTOR_ID_HEADER} is not a valid UUID")))?;
    let role = match header_value(headers, ACTOR_ROLE_HEADER)? {
        "admin" => ActorRole::Admin,
        "teacher" => ActorRole::Teacher,
        other => {
            return Err(StudioError::Forbidden(format!(
                "unknown actor role '{other}'"
            )));
        }
    };
    Ok(Actor { user_id, role })
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, StudioError> {
    headers
        .get(name)
        .ok_or_else(|| StudioError::Forbidden(format!("missing {name} header")))?
        .to_str()
        .map(str::trim)
        .map_err(|_| StudioError::Forbidden(format!("{name} is not valid text")))
}
