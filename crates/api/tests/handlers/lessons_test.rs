use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{ActingAs, TestApp};

#[tokio::test]
async fn test_book_lesson_returns_created() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "16:00", "16:45"))
        .acting_as(&app.admin)
        .await;

    response.assert_status(StatusCode::CREATED);
    let lesson: Value = response.json();
    assert_eq!(lesson["status"], "scheduled");
    assert_eq!(lesson["start_time"], "16:00");
    assert_eq!(lesson["duration"], 45);

    let id = lesson["id"].as_str().unwrap();
    let fetched: Value = app.server.get(&format!("/api/lessons/{id}")).await.json();
    assert_eq!(fetched, lesson);
}

#[tokio::test]
async fn test_double_booking_is_a_conflict() {
    let app = TestApp::new().await;
    let existing = app.book("2030-02-04", "16:00", "16:45").await;

    let response = app
        .server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "16:30", "17:00"))
        .acting_as(&app.admin)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["conflict"]["kind"], "double_booked");
    assert_eq!(body["conflict"]["lane"], "room");
    assert_eq!(body["conflict"]["existing_id"], existing["id"]);
}

#[tokio::test]
async fn test_back_to_back_lessons_are_allowed() {
    let app = TestApp::new().await;
    app.book("2030-02-04", "16:00", "16:45").await;

    app.server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "16:45", "17:30"))
        .acting_as(&app.admin)
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_needs_an_admin() {
    let app = TestApp::new().await;
    let body = app.lesson_body("2030-02-04", "16:00", "16:45");

    app.server
        .post("/api/lessons")
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let teacher = studiosync_core::models::people::Actor::teacher(app.teacher.user_id);
    app.server
        .post("/api/lessons")
        .json(&body)
        .acting_as(&teacher)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let app = TestApp::new().await;

    app.server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "17:00", "16:00"))
        .acting_as(&app.admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_lesson_is_not_found() {
    let app = TestApp::new().await;

    app.server
        .get(&format!("/api/lessons/{}", uuid::Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancelled_lesson_frees_the_slot() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let id = lesson["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/lessons/{id}/cancel"))
        .json(&json!({ "reason": "student sick" }))
        .acting_as(&app.admin)
        .await;
    response.assert_status_ok();
    let cancelled: Value = response.json();
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellation_reason"], "student sick");

    app.server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "16:00", "16:45"))
        .acting_as(&app.admin)
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_rechecks_other_lessons() {
    let app = TestApp::new().await;
    app.book("2030-02-04", "16:00", "16:45").await;

    let mut other = app.lesson_body("2030-02-04", "17:00", "17:45");
    other["room_id"] = json!(app.other_room.id);
    other["student_id"] = json!(app.other_student.id);
    other["teacher_id"] = json!(app.substitutes[0].id);
    let other: Value = app
        .server
        .post("/api/lessons")
        .json(&other)
        .acting_as(&app.admin)
        .await
        .json();
    let id = other["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/api/lessons/{id}"))
        .json(&json!({ "room_id": app.room.id, "start_time": "16:30", "end_time": "17:15" }))
        .acting_as(&app.admin)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let moved = app
        .server
        .put(&format!("/api/lessons/{id}"))
        .json(&json!({ "start_time": "18:00", "end_time": "18:30" }))
        .acting_as(&app.admin)
        .await;
    moved.assert_status_ok();
    let moved: Value = moved.json();
    assert_eq!(moved["start_time"], "18:00");
    assert_eq!(moved["duration"], 30);
}

#[tokio::test]
async fn test_bulk_cancel() {
    let app = TestApp::new().await;
    app.book("2030-02-04", "16:00", "16:45").await;
    app.book("2030-02-11", "16:00", "16:45").await;
    app.book("2030-03-04", "16:00", "16:45").await;

    let response = app
        .server
        .post("/api/lessons/bulk-cancel")
        .json(&json!({
            "teacher_id": app.teacher.id,
            "from": "2030-02-01",
            "until": "2030-02-28",
            "reason": "tour",
        }))
        .acting_as(&app.admin)
        .await;

    response.assert_status_ok();
    let cancelled: Vec<Value> = response.json();
    assert_eq!(cancelled.len(), 2);
    assert!(cancelled.iter().all(|lesson| lesson["status"] == "cancelled"));
}

#[tokio::test]
async fn test_conflict_query() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;

    let body: Value = app
        .server
        .get("/api/conflicts")
        .add_query_param("kind", "teacher")
        .add_query_param("resource_id", app.teacher.id)
        .add_query_param("date", "2030-02-04")
        .add_query_param("start_time", "16:30")
        .add_query_param("end_time", "17:00")
        .await
        .json();
    assert_eq!(body["conflict"], true);
    assert_eq!(body["conflicting_lesson_id"], lesson["id"]);

    let body: Value = app
        .server
        .get("/api/conflicts")
        .add_query_param("kind", "teacher")
        .add_query_param("resource_id", app.teacher.id)
        .add_query_param("date", "2030-02-04")
        .add_query_param("start_time", "16:30")
        .add_query_param("end_time", "17:00")
        .add_query_param("exclude_id", lesson["id"].as_str().unwrap())
        .await
        .json();
    assert_eq!(body["conflict"], false);
    assert_eq!(body["conflicting_lesson_id"], Value::Null);
}

#[tokio::test]
async fn test_missing_field_is_a_validation_error() {
    let app = TestApp::new().await;
    let mut body = app.lesson_body("2030-02-04", "16:00", "16:45");
    body.as_object_mut().unwrap().remove("teacher_id");

    let response = app
        .server
        .post("/api/lessons")
        .json(&body)
        .acting_as(&app.admin)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(
        error["error"].as_str().unwrap().contains("teacher_id"),
        "{error}"
    );
}

#[tokio::test]
async fn test_malformed_time_is_a_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/lessons")
        .json(&app.lesson_body("2030-02-04", "9:00", "09:45"))
        .acting_as(&app.admin)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["error"].as_str().unwrap().contains("9:00"), "{error}");
}

#[tokio::test]
async fn test_malformed_conflict_query_is_a_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/conflicts")
        .add_query_param("kind", "teacher")
        .add_query_param("resource_id", app.teacher.id)
        .add_query_param("date", "2030-02-04")
        .add_query_param("start_time", "16:30")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["error"].is_string(), "{error}");
}
