use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{ActingAs, TestApp};

/// Mondays 16:00-16:45 through January 2030.
fn schedule_body(app: &TestApp) -> Value {
    json!({
        "teacher_id": app.teacher.id,
        "student_id": app.student.id,
        "room_id": app.room.id,
        "instrument": "piano",
        "day_of_week": 1,
        "start_time": "16:00",
        "end_time": "16:45",
        "effective_from": "2030-01-07",
        "effective_until": "2030-01-31",
    })
}

async fn create(app: &TestApp) -> Value {
    let response = app
        .server
        .post("/api/schedules")
        .json(&schedule_body(app))
        .acting_as(&app.admin)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

fn dates(lessons: &Value) -> Vec<String> {
    lessons
        .as_array()
        .unwrap()
        .iter()
        .map(|lesson| lesson["date"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_schedule_materializes_horizon() {
    let app = TestApp::new().await;

    let created = create(&app).await;

    assert_eq!(created["schedule"]["is_active"], true);
    assert_eq!(
        dates(&created["generation"]["created"]),
        vec!["2030-01-07", "2030-01-14"]
    );
    assert_eq!(created["generation"]["skipped"], json!([]));
}

#[tokio::test]
async fn test_generate_skips_existing_dates() {
    let app = TestApp::new().await;
    let created = create(&app).await;
    let id = created["schedule"]["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/schedules/{id}/generate"))
        .json(&json!({ "from": "2030-01-01", "until": "2030-01-31" }))
        .acting_as(&app.admin)
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(dates(&report["created"]), vec!["2030-01-21", "2030-01-28"]);
    let skipped: Vec<&str> = report["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(skipped, vec!["2030-01-07", "2030-01-14"]);
}

#[tokio::test]
async fn test_generation_range_is_limited() {
    let app = TestApp::new().await;
    let created = create(&app).await;
    let id = created["schedule"]["id"].as_str().unwrap();

    app.server
        .post(&format!("/api/schedules/{id}/generate"))
        .json(&json!({ "from": "2030-01-01", "until": "2030-06-30" }))
        .acting_as(&app.admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlapping_schedule_is_a_conflict() {
    let app = TestApp::new().await;
    create(&app).await;

    let mut body = schedule_body(&app);
    body["room_id"] = json!(app.other_room.id);
    body["student_id"] = json!(app.other_student.id);
    body["start_time"] = json!("16:30");
    body["end_time"] = json!("17:00");

    let response = app
        .server
        .post("/api/schedules")
        .json(&body)
        .acting_as(&app.admin)
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["conflict"]["kind"], "schedule_overlap");
    assert_eq!(error["conflict"]["lane"], "teacher");
}

#[tokio::test]
async fn test_update_and_deactivate_schedule() {
    let app = TestApp::new().await;
    let created = create(&app).await;
    let id = created["schedule"]["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/api/schedules/{id}"))
        .json(&json!({ "effective_until": null }))
        .acting_as(&app.admin)
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["effective_until"], Value::Null);

    let response = app
        .server
        .post(&format!("/api/schedules/{id}/deactivate"))
        .acting_as(&app.admin)
        .await;
    response.assert_status_ok();

    let fetched: Value = app.server.get(&format!("/api/schedules/{id}")).await.json();
    assert_eq!(fetched["is_active"], false);

    app.server
        .post(&format!("/api/schedules/{id}/generate"))
        .json(&json!({ "from": "2030-02-01", "until": "2030-02-28" }))
        .acting_as(&app.admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
