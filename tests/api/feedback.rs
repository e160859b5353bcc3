use secrecy::ExposeSecret;
use sentiwatch::notifier::sign_feedback_link;

use crate::helpers::spawn_app;

#[tokio::test]
async fn valid_feedback_link_marks_the_sentiment_dismissed() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "feedback-1",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "medium",
            "https://vendor.example/j",
            false,
        )
        .await
        .unwrap();
    let queue_id = store
        .enqueue_feedback("webhook", "feedback-1", chrono::Utc::now().naive_utc())
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    let secret = app.settings.feedback.link_secret.expose_secret();
    let sig = sign_feedback_link(secret, queue_id, "feedback-1", expiry);

    let url = format!(
        "/api/feedback?queue_id={queue_id}&sentiment_id=feedback-1&expiry={expiry}&sig={sig}&judgement=false&type=false_positive"
    );
    let response = app.get(&url).await;
    assert_eq!(response.status().as_u16(), 200);

    let sentiment = store.get_sentiment("feedback-1").await.unwrap();
    assert_eq!(sentiment.status, "dismissed");
}

#[tokio::test]
async fn expired_feedback_link_is_rejected() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "feedback-2",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "medium",
            "https://vendor.example/k",
            false,
        )
        .await
        .unwrap();
    let queue_id = store
        .enqueue_feedback("webhook", "feedback-2", chrono::Utc::now().naive_utc())
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
    let secret = app.settings.feedback.link_secret.expose_secret();
    let sig = sign_feedback_link(secret, queue_id, "feedback-2", expiry);

    let url = format!(
        "/api/feedback?queue_id={queue_id}&sentiment_id=feedback-2&expiry={expiry}&sig={sig}&judgement=true&type=confirmed"
    );
    let response = app.get(&url).await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn resolving_one_queue_row_leaves_a_sibling_pending_row_untouched() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "feedback-4",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "medium",
            "https://vendor.example/m",
            false,
        )
        .await
        .unwrap();
    let now = chrono::Utc::now().naive_utc();
    // Two pending reminders for the same sentiment, as happens when an
    // escalating event re-notifies before the first reminder is answered.
    let first_queue_id = store.enqueue_feedback("webhook", "feedback-4", now).await.unwrap();
    let second_queue_id = store.enqueue_feedback("webhook", "feedback-4", now).await.unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    let secret = app.settings.feedback.link_secret.expose_secret();
    let sig = sign_feedback_link(secret, first_queue_id, "feedback-4", expiry);

    let url = format!(
        "/api/feedback?queue_id={first_queue_id}&sentiment_id=feedback-4&expiry={expiry}&sig={sig}&judgement=true&type=confirmed"
    );
    let response = app.get(&url).await;
    assert_eq!(response.status().as_u16(), 200);

    // Replaying the same queue_id a second time must fail: the row is no
    // longer `pending`, so it can't be resolved twice.
    let replay = app.get(&url).await;
    assert_eq!(replay.status().as_u16(), 404);

    // The sibling row for the same sentiment is untouched, so it can still
    // be answered independently.
    let second_sig = sign_feedback_link(secret, second_queue_id, "feedback-4", expiry);
    let second_url = format!(
        "/api/feedback?queue_id={second_queue_id}&sentiment_id=feedback-4&expiry={expiry}&sig={second_sig}&judgement=false&type=false_positive"
    );
    let second_response = app.get(&second_url).await;
    assert_eq!(second_response.status().as_u16(), 200);
}

#[tokio::test]
async fn tampered_feedback_signature_is_rejected() {
    let app = spawn_app().await;
    let store = app.store();

    store
        .insert_sentiment(
            "feedback-3",
            None,
            "XX Hospital",
            "title",
            "vendor.example",
            "body",
            "reason",
            "medium",
            "https://vendor.example/l",
            false,
        )
        .await
        .unwrap();
    let queue_id = store
        .enqueue_feedback("webhook", "feedback-3", chrono::Utc::now().naive_utc())
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    let secret = app.settings.feedback.link_secret.expose_secret();
    let sig = sign_feedback_link(secret, queue_id, "feedback-3", expiry);

    // Bump the signed expiry by one second after signing, without re-signing.
    let url = format!(
        "/api/feedback?queue_id={queue_id}&sentiment_id=feedback-3&expiry={}&sig={sig}&judgement=true&type=confirmed",
        expiry + 1
    );
    let response = app.get(&url).await;
    assert_eq!(response.status().as_u16(), 401);
}
