use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn get_suppress_keywords_requires_admin_token() {
    let app = spawn_app().await;

    let response = app.get("/api/notification/suppress_keywords").await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_can_set_and_read_back_suppress_keywords() {
    let app = spawn_app().await;

    let set = app
        .post_json_admin(
            "/api/notification/suppress_keywords",
            &json!({"keywords": ["test drill", "scheduled maintenance"]}),
        )
        .await;
    assert_eq!(set.status().as_u16(), 200);

    let get = app.get_admin("/api/notification/suppress_keywords").await;
    assert_eq!(get.status().as_u16(), 200);
    let body: serde_json::Value = get.json().await.unwrap();
    let keywords = body["keywords"].as_array().unwrap();
    assert_eq!(keywords.len(), 2);
}
