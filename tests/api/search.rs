use crate::helpers::spawn_app;

#[tokio::test]
async fn search_rejects_empty_query() {
    let app = spawn_app().await;

    let response = app.get("/api/search?query=").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn search_matches_title_content_reason_and_hospital() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "sent-search-1",
            None,
            "Needle Memorial Hospital",
            "unrelated title",
            "vendor.example",
            "unrelated content",
            "unrelated reason",
            "low",
            "https://vendor.example/d",
            false,
        )
        .await
        .unwrap();
    store
        .insert_sentiment(
            "sent-search-2",
            None,
            "Other Hospital",
            "nothing in common",
            "vendor.example",
            "nothing in common",
            "nothing in common",
            "low",
            "https://vendor.example/e",
            false,
        )
        .await
        .unwrap();

    let response = app.get("/api/search?query=Needle").await;
    assert_eq!(response.status().as_u16(), 200);

    let rows: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sentiment_id"], "sent-search-1");
}
