use axum::http::{HeaderMap, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use studiosync_api::middleware::{
    auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, actor_from_headers},
    error_handling::map_error,
};
use studiosync_core::{
    errors::{Conflict, SerializationFailure, StudioError},
    models::people::ActorRole,
};
use uuid::Uuid;

#[rstest]
#[case(StudioError::NotFound("Lesson".to_string()), StatusCode::NOT_FOUND)]
#[case(StudioError::Validation("bad range".to_string()), StatusCode::BAD_REQUEST)]
#[case(StudioError::Forbidden("admins only".to_string()), StatusCode::FORBIDDEN)]
#[case(
    StudioError::Conflict(Conflict::ConcurrentModification),
    StatusCode::CONFLICT
)]
#[case(StudioError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status(#[case] error: StudioError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[tokio::test]
async fn test_conflict_body_names_the_lane() {
    let existing_id = Uuid::new_v4();
    let error = StudioError::Conflict(Conflict::DoubleBooked {
        lane: studiosync_core::conflict::ResourceKind::Room,
        resource_id: Uuid::new_v4(),
        resource_name: "Studio A".to_string(),
        with_name: "Jonah".to_string(),
        existing_id,
        start: "16:00".parse().unwrap(),
        end: "16:30".parse().unwrap(),
    });

    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["conflict"]["kind"], "double_booked");
    assert_eq!(body["conflict"]["lane"], "room");
    assert_eq!(body["conflict"]["existing_id"], existing_id.to_string());
    assert_eq!(body["conflict"]["start"], "16:00");
    assert!(
        body["error"].as_str().unwrap().contains("Studio A"),
        "{body}"
    );
}

#[test]
fn test_serialization_failure_maps_to_conflict() {
    let report = eyre::Report::new(SerializationFailure).wrap_err("could not serialize access");
    let response = map_error(StudioError::from(report));
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

fn headers(id: &str, role: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACTOR_ID_HEADER, HeaderValue::from_str(id).unwrap());
    headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
    headers
}

#[test]
fn test_actor_from_headers() {
    let user_id = Uuid::new_v4();

    let actor = actor_from_headers(&headers(&user_id.to_string(), "admin")).unwrap();
    assert_eq!(actor.user_id, user_id);
    assert_eq!(actor.role, ActorRole::Admin);

    let actor = actor_from_headers(&headers(&user_id.to_string(), " teacher ")).unwrap();
    assert_eq!(actor.role, ActorRole::Teacher);
}

#[rstest]
#[case::bad_uuid("not-a-uuid", "admin")]
#[case::unknown_role("6f1c1f9e-4a55-4f57-9d0e-2a1f3f7b9c10", "janitor")]
fn test_invalid_actor_headers(#[case] id: &str, #[case] role: &str) {
    let err = actor_from_headers(&headers(id, role)).unwrap_err();
    assert!(matches!(err, StudioError::Forbidden(_)), "{err}");
}

#[test]
fn test_missing_actor_headers() {
    let err = actor_from_headers(&HeaderMap::new()).unwrap_err();
    assert!(err.to_string().contains(ACTOR_ID_HEADER), "{err}");
}
