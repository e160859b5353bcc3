use crate::helpers::spawn_app;

#[tokio::test]
async fn list_opinions_returns_seeded_rows() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "sent-1",
            None,
            "XX First People's Hospital",
            "Patient complains about billing",
            "vendor.example",
            "full article body",
            "billing dispute",
            "medium",
            "https://vendor.example/a",
            false,
        )
        .await
        .unwrap();

    let response = app.get("/api/opinions").await;
    assert_eq!(response.status().as_u16(), 200);

    let rows: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sentiment_id"], "sent-1");
}

#[tokio::test]
async fn list_opinions_compact_mode_truncates_content() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "sent-2",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "0123456789abcdef",
            "reason text",
            "low",
            "https://vendor.example/b",
            false,
        )
        .await
        .unwrap();

    let response = app.get("/api/opinions?compact=true&preview=4").await;
    assert_eq!(response.status().as_u16(), 200);

    let rows: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(rows[0]["content"], "0123");
}

#[tokio::test]
async fn get_opinion_returns_404_for_unknown_id() {
    let app = spawn_app().await;

    let response = app.get("/api/opinions/does-not-exist").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn get_opinion_returns_the_seeded_row() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "sent-3",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "high",
            "https://vendor.example/c",
            false,
        )
        .await
        .unwrap();

    let response = app.get("/api/opinions/sent-3").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["severity"], "high");
}
