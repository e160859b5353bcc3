use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Serialize;
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::configuration::{FeedbackSettings, NotificationSettings};
use crate::store::{EventRow, SentimentRow, Store};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
struct NotificationPayload {
    title: String,
    hospital: String,
    severity: String,
    source: String,
    body_preview: String,
    reason: String,
    url: String,
    total_count: i64,
    feedback_url: String,
}

const BODY_PREVIEW_BYTES: usize = 500;
/// How many deliveries `drain_once` will retry inline before giving up and
/// rescheduling through the persisted queue (R_notify).
const MAX_INLINE_ATTEMPTS: u32 = 3;

/// Signs `(queue_id, sentiment_id, expiry)` with the shared feedback secret
/// so `/api/feedback` can verify a link it did not itself issue.
pub fn sign_feedback_link(
    secret: &str,
    queue_id: u64,
    sentiment_id: &str,
    expiry_unix: i64,
) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(format!("{queue_id}|{sentiment_id}|{expiry_unix}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_feedback_link(
    secret: &str,
    queue_id: u64,
    sentiment_id: &str,
    expiry_unix: i64,
    signature: &str,
) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(format!("{queue_id}|{sentiment_id}|{expiry_unix}").as_bytes());
    // `Mac::verify_slice` compares in constant time, unlike a `==` on the
    // decoded bytes.
    mac.verify_slice(&sig_bytes).is_ok()
}

fn feedback_url(base_url: &str, secret: &str, queue_id: u64, sentiment_id: &str, ttl_hours: i64) -> String {
    let expiry = (Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp();
    let sig = sign_feedback_link(secret, queue_id, sentiment_id, expiry);
    format!(
        "{base_url}/api/feedback?queue_id={queue_id}&sentiment_id={sentiment_id}&expiry={expiry}&sig={sig}"
    )
}

fn build_payload(
    event: &EventRow,
    sentiment: &SentimentRow,
    feedback: &FeedbackSettings,
    queue_id: u64,
) -> NotificationPayload {
    let preview: String = sentiment.content.chars().take(BODY_PREVIEW_BYTES).collect();
    NotificationPayload {
        title: sentiment.title.clone(),
        hospital: sentiment.hospital_name.clone(),
        severity: sentiment.severity.clone(),
        source: sentiment.source.clone(),
        body_preview: preview,
        reason: sentiment.reason.clone(),
        url: sentiment.url.clone(),
        total_count: event.total_count,
        feedback_url: feedback_url(
            &feedback.link_base_url,
            feedback.link_secret.expose_secret(),
            queue_id,
            &sentiment.sentiment_id,
            feedback.link_ttl_hours,
        ),
    }
}

/// Enqueues one notification; the delivery worker drains it separately so a
/// slow/unreachable webhook never blocks the ingestion tick.
pub async fn notify(
    store: &Store,
    feedback: &FeedbackSettings,
    event: &EventRow,
    sentiment: &SentimentRow,
) -> Result<(), anyhow::Error> {
    let queue_id = store
        .enqueue_feedback(
            "webhook", // system-originated feedback-queue row, not a human reviewer
            &sentiment.sentiment_id,
            Utc::now().naive_utc(),
        )
        .await?;
    let payload = build_payload(event, sentiment, feedback, queue_id);
    let payload_json = serde_json::to_string(&payload)?;
    store
        .enqueue_notification(event.id, &sentiment.sentiment_id, &payload_json)
        .await?;
    Ok(())
}

/// Drains due rows from `notification_queue` and POSTs each to every
/// configured webhook, resigning with the webhook's own HMAC secret when one
/// is set. Runs on its own interval, independent of the ingestion tick.
pub async fn drain_once(store: &Store, notification: &NotificationSettings, client: &reqwest::Client) {
    loop {
        let row = match store.dequeue_notification().await {
            Ok(Some(row)) => row,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "failed to dequeue notification");
                return;
            }
        };

        let mut delivered = false;
        for webhook in &notification.webhooks {
            match deliver(client, webhook, &row.payload).await {
                Ok(()) => delivered = true,
                Err(e) => warn!(webhook, error = %e, "webhook delivery failed"),
            }
        }

        if delivered || notification.webhooks.is_empty() {
            if let Err(e) = store.delete_notification(row.id).await {
                error!(error = %e, "failed to delete delivered notification");
            }
        } else if row.attempts >= MAX_INLINE_ATTEMPTS as i32 {
            warn!(id = row.id, attempts = row.attempts, "notification exceeded retry budget, leaving queued");
            let backoff = Utc::now().naive_utc() + chrono::Duration::minutes(30);
            let _ = store.reschedule_notification(row.id, backoff).await;
        } else {
            let backoff = Utc::now().naive_utc() + chrono::Duration::seconds(30 * row.attempts as i64);
            let _ = store.reschedule_notification(row.id, backoff).await;
        }
    }
}


async fn deliver(client: &reqwest::Client, webhook_url: &str, payload_json: &str) -> Result<(), anyhow::Error> {
    let response = client
        .post(webhook_url)
        .timeout(Duration::from_secs(10))
        .header("Content-Type", "application/json")
        .body(payload_json.to_string())
        .send()
        .await?;
    response.error_for_status()?;
    info!(webhook_url, "notification delivered");
    Ok(())
}
