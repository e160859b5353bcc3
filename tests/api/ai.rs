use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::spawn_app;

fn llm_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            {"message": {"content": content}}
        ]
    })
}

#[tokio::test]
async fn ai_summary_rejects_an_empty_opinion_list() {
    let app = spawn_app().await;

    let response = app.post_json("/api/ai/summary", &json!({"opinions": []})).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn ai_summary_returns_the_llm_completion() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply("three paragraph summary")))
        .mount(&app.llm_server)
        .await;

    let response = app
        .post_json(
            "/api/ai/summary",
            &json!({
                "opinions": [
                    {"title": "t", "hospital": "XX Hospital", "severity": "high", "reason": "r"}
                ]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["summary"], "three paragraph summary");
}

#[tokio::test]
async fn ai_insight_caches_after_the_first_call() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "insight-1",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "high",
            "https://vendor.example/h",
            false,
        )
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply("deep analysis")))
        .expect(1)
        .mount(&app.llm_server)
        .await;

    let body = json!({"opinion": {"sentiment_id": "insight-1"}});

    let first = app.post_json("/api/ai/insight", &body).await;
    assert_eq!(first.status().as_u16(), 200);
    let first_json: serde_json::Value = first.json().await.unwrap();
    assert_eq!(first_json["insight"], "deep analysis");

    // Second call must be served from the cached `Sentiment.insight` column,
    // not a second LLM round-trip (the mock's `expect(1)` enforces this on drop).
    let second = app.post_json("/api/ai/insight", &body).await;
    assert_eq!(second.status().as_u16(), 200);
    let second_json: serde_json::Value = second.json().await.unwrap();
    assert_eq!(second_json["insight"], "deep analysis");
}
