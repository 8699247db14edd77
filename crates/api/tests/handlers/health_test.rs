use serde_json::Value;

use crate::test_utils::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_version() {
    let app = TestApp::new().await;

    let body: Value = app.server.get("/version").await.json();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
