use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use studiosync_core::models::people::Actor;
use studiosync_core::notify::NotificationKind;
use studiosync_db::mock::MockNotificationSink;

use crate::test_utils::{ActingAs, TestApp};

async fn report_absence(app: &TestApp) -> Value {
    let response = app
        .server
        .post("/api/absences")
        .json(&json!({
            "teacher_id": app.teacher.id,
            "start_date": "2030-02-04",
            "end_date": "2030-02-05",
            "reason": "  conference ",
        }))
        .acting_as(&app.admin)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn broadcast(app: &TestApp, absence_id: &str, lesson_id: &str) -> Vec<Value> {
    let response = app
        .server
        .post(&format!("/api/absences/{absence_id}/substitute-requests"))
        .json(&json!({
            "mode": "broadcast",
            "offers": [{
                "lesson_id": lesson_id,
                "teacher_ids": [app.substitutes[0].id, app.substitutes[1].id],
            }],
        }))
        .acting_as(&app.admin)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

fn request_for<'a>(requests: &'a [Value], teacher_id: uuid::Uuid) -> &'a str {
    requests
        .iter()
        .find(|r| r["substitute_teacher_id"] == json!(teacher_id))
        .and_then(|r| r["id"].as_str())
        .unwrap()
}

#[tokio::test]
async fn test_report_absence_lists_affected_lessons() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    app.book("2030-02-11", "16:00", "16:45").await;

    let reported = report_absence(&app).await;

    assert_eq!(reported["absence"]["reason"], "conference");
    assert_eq!(reported["absence"]["status"], "pending");
    let affected = reported["affected_lessons"].as_array().unwrap();
    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0]["id"], lesson["id"]);
}

#[tokio::test]
async fn test_candidates_exclude_the_absent_teacher() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let id = lesson["id"].as_str().unwrap();

    let candidates: Vec<Value> = app
        .server
        .get(&format!("/api/lessons/{id}/candidates"))
        .await
        .json();

    let names: Vec<&str> = candidates
        .iter()
        .map(|c| c["teacher"]["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Lena", "Marco"]);
    assert!(candidates.iter().all(|c| c["completed_lessons"] == 0));
}

#[test_log::test(tokio::test)]
async fn test_first_approval_wins() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let lesson_id = lesson["id"].as_str().unwrap();
    let reported = report_absence(&app).await;
    let absence_id = reported["absence"]["id"].as_str().unwrap();

    let requests = broadcast(&app, absence_id, lesson_id).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["broadcast_group_id"], requests[1]["broadcast_group_id"]);

    let marco = &app.substitutes[0];
    let lena = &app.substitutes[1];

    let response = app
        .server
        .post(&format!(
            "/api/substitute-requests/{}/respond",
            request_for(&requests, marco.id)
        ))
        .json(&json!({ "action": "approve" }))
        .acting_as(&Actor::teacher(marco.user_id))
        .await;
    response.assert_status_ok();
    let approved: Value = response.json();
    assert_eq!(approved["status"], "approved");

    let response = app
        .server
        .post(&format!(
            "/api/substitute-requests/{}/respond",
            request_for(&requests, lena.id)
        ))
        .json(&json!({ "action": "approve" }))
        .acting_as(&Actor::teacher(lena.user_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["conflict"]["kind"], "already_covered");

    let reassigned: Value = app
        .server
        .get(&format!("/api/lessons/{lesson_id}"))
        .await
        .json();
    assert_eq!(reassigned["teacher_id"], json!(marco.id));

    let overview: Value = app
        .server
        .get(&format!("/api/absences/{absence_id}"))
        .await
        .json();
    assert_eq!(overview["status"], "fully_covered");
    assert_eq!(overview["lessons_total"], 1);
    assert_eq!(overview["lessons_covered"], 1);
}

#[tokio::test]
async fn test_only_the_addressee_may_respond() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let reported = report_absence(&app).await;
    let absence_id = reported["absence"]["id"].as_str().unwrap();
    let requests = broadcast(&app, absence_id, lesson["id"].as_str().unwrap()).await;

    let marco_request = request_for(&requests, app.substitutes[0].id);
    app.server
        .post(&format!("/api/substitute-requests/{marco_request}/respond"))
        .json(&json!({ "action": "approve" }))
        .acting_as(&Actor::teacher(app.substitutes[1].user_id))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_decline_keeps_absence_open() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let reported = report_absence(&app).await;
    let absence_id = reported["absence"]["id"].as_str().unwrap();
    let requests = broadcast(&app, absence_id, lesson["id"].as_str().unwrap()).await;

    let marco = &app.substitutes[0];
    let response = app
        .server
        .post(&format!(
            "/api/substitute-requests/{}/respond",
            request_for(&requests, marco.id)
        ))
        .json(&json!({ "action": "decline", "notes": "out of town" }))
        .acting_as(&Actor::teacher(marco.user_id))
        .await;
    response.assert_status_ok();
    let declined: Value = response.json();
    assert_eq!(declined["status"], "declined");

    let overview: Value = app
        .server
        .get(&format!("/api/absences/{absence_id}"))
        .await
        .json();
    assert_eq!(overview["status"], "coverage_needed");
}

#[tokio::test]
async fn test_cancel_absence_withdraws_requests() {
    let app = TestApp::new().await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let reported = report_absence(&app).await;
    let absence_id = reported["absence"]["id"].as_str().unwrap();
    broadcast(&app, absence_id, lesson["id"].as_str().unwrap()).await;

    let response = app
        .server
        .post(&format!("/api/absences/{absence_id}/cancel"))
        .acting_as(&app.admin)
        .await;
    response.assert_status_ok();
    let cancelled: Value = response.json();
    assert_eq!(cancelled["status"], "cancelled");

    let overview: Value = app
        .server
        .get(&format!("/api/absences/{absence_id}"))
        .await
        .json();
    assert!(
        overview["requests"]
            .as_array()
            .unwrap()
            .iter()
            .all(|r| r["status"] == "cancelled"),
        "{overview}"
    );
}

#[tokio::test]
async fn test_broadcast_notifies_each_candidate() {
    let mut sink = MockNotificationSink::new();
    sink.expect_notify()
        .withf(|n| n.kind == NotificationKind::SubstituteRequested)
        .times(2)
        .returning(|_| Ok(()));

    let app = TestApp::with_sink(Arc::new(sink)).await;
    let lesson = app.book("2030-02-04", "16:00", "16:45").await;
    let reported = report_absence(&app).await;
    let absence_id = reported["absence"]["id"].as_str().unwrap();

    broadcast(&app, absence_id, lesson["id"].as_str().unwrap()).await;
}
