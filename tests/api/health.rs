use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_reports_ok_when_the_database_is_reachable() {
    let app = spawn_app().await;

    let response = app.get("/api/health").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
