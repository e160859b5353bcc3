use crate::helpers::spawn_app;

#[tokio::test]
async fn stats_rejects_unsupported_range() {
    let app = spawn_app().await;

    let response = app.get("/api/stats?range=90d").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn stats_aggregates_seeded_sentiments() {
    let app = spawn_app().await;
    let store = app.store();

    for (id, severity, status) in [
        ("s1", "high", "active"),
        ("s2", "low", "dismissed"),
        ("s3", "medium", "active"),
    ] {
        let row = store
            .insert_sentiment(
                id,
                None,
                "XX Hospital",
                "title",
                "vendor.example",
                "body",
                "reason",
                severity,
                "https://vendor.example/f",
                false,
            )
            .await
            .unwrap();
        if status == "dismissed" {
            store
                .set_sentiment_status(&row.sentiment_id, "dismissed", Some(chrono::Utc::now().naive_utc()))
                .await
                .unwrap();
        }
    }

    let response = app.get("/api/stats?range=7d").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["high"], 1);
    assert_eq!(body["dismissed"], 1);
    assert_eq!(body["by_hospital"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn trend_buckets_by_hour_for_the_24h_range() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "trend-1",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "high",
            "https://vendor.example/g",
            false,
        )
        .await
        .unwrap();

    let response = app.get("/api/stats/trend?range=24h").await;
    assert_eq!(response.status().as_u16(), 200);

    let points: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["count"], 1);
    assert!(points[0]["label"].as_str().unwrap().ends_with(":00"));
}
