use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn generate_report_requires_admin_token() {
    let app = spawn_app().await;

    let response = app
        .post_json(
            "/api/report/generate",
            &json!({"hospital": "XX Hospital", "start_date": "2026-01-01", "end_date": "2026-01-31"}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn generate_report_word_format_is_not_implemented() {
    let app = spawn_app().await;

    let response = app
        .post_json_admin(
            "/api/report/generate",
            &json!({
                "hospital": "XX Hospital",
                "start_date": "2026-01-01",
                "end_date": "2026-01-31",
                "format": "word",
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 501);
}

#[tokio::test]
async fn generate_and_download_a_markdown_report() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "report-1",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "high",
            "https://vendor.example/i",
            false,
        )
        .await
        .unwrap();

    let generate = app
        .post_json_admin(
            "/api/report/generate",
            &json!({
                "hospital": "XX Hospital",
                "start_date": "2020-01-01",
                "end_date": "2030-01-01",
            }),
        )
        .await;
    assert_eq!(generate.status().as_u16(), 200);
    let body: serde_json::Value = generate.json().await.unwrap();
    let filename = body["filename"].as_str().unwrap().to_string();

    let download = app
        .get_admin(&format!("/api/report/download/{filename}"))
        .await;
    assert_eq!(download.status().as_u16(), 200);
    let text = download.text().await.unwrap();
    assert!(text.contains("XX Hospital"));
}

#[tokio::test]
async fn download_report_rejects_path_traversal() {
    let app = spawn_app().await;

    let response = app
        .get_admin("/api/report/download/..%2f..%2fetc%2fpasswd")
        .await;

    assert!(response.status().as_u16() == 400 || response.status().as_u16() == 404);
}
