use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{canonicalize_url, fingerprint, normalize_hospital, Article, Severity, Verdict};
use crate::store::{Store, StoreError};

pub struct AggregationResult {
    pub sentiment_id: String,
    /// `None` for a non-negative verdict: it is persisted as a Sentiment but
    /// never joins an Event or triggers a notification.
    pub event_id: Option<u64>,
    pub is_duplicate: bool,
    /// Set when the Notifier should fire: first occurrence, or an
    /// escalation to a strictly higher severity than the event's prior one.
    pub should_notify: bool,
}

/// Serializes concurrent aggregation on the same (hospital, fingerprint) key
/// within this process; the `uq_event_open` constraint in the database is
/// the backstop for whatever this in-process lock doesn't catch (multiple
/// instances, a lock that was dropped on panic, etc).
pub struct Aggregator {
    store: Store,
    window: Duration,
    tracking_params: std::collections::HashSet<String>,
    locks: DashMap<(String, u64), Arc<Mutex<()>>>,
}

impl Aggregator {
    pub fn new(store: Store, window_hours: i64, tracking_params: std::collections::HashSet<String>) -> Self {
        Self {
            store,
            window: Duration::hours(window_hours),
            tracking_params,
            locks: DashMap::new(),
        }
    }

    fn key_lock(&self, hospital: &str, fp: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry((hospital.to_string(), fp))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Every classified article yields exactly one persisted Sentiment.
    /// Non-negative verdicts are recorded for the record but skip event
    /// aggregation and notification entirely.
    pub async fn aggregate(
        &self,
        article: &Article,
        verdict: &Verdict,
    ) -> Result<AggregationResult, StoreError> {
        if !verdict.is_negative {
            let sentiment_id = Uuid::new_v4().to_string();
            let hospital = normalize_hospital(&article.hospital);
            self.store
                .insert_sentiment(
                    &sentiment_id,
                    None,
                    &hospital,
                    &verdict.title,
                    &article.source,
                    &article.body,
                    &verdict.reason,
                    verdict.severity.as_str(),
                    &article.url,
                    false,
                )
                .await?;
            return Ok(AggregationResult {
                sentiment_id,
                event_id: None,
                is_duplicate: false,
                should_notify: false,
            });
        }

        let canonical = match canonicalize_url(&article.url, &self.tracking_params) {
            Ok(c) => c,
            Err(_) => article.url.clone(),
        };
        let hospital = normalize_hospital(&article.hospital);
        let fp = fingerprint(&canonical, &hospital);

        let lock = self.key_lock(&hospital, fp);
        let _guard = lock.lock().await;

        let now = Utc::now().naive_utc();
        let window_start = now - self.window;
        let sentiment_id = Uuid::new_v4().to_string();
        let severity = verdict.severity.as_str();

        self.store
            .close_stale_event(&hospital, fp, window_start)
            .await?;

        let existing = self.store.find_open_event(&hospital, fp, window_start).await?;

        let (event_id, is_duplicate, should_notify) = match existing {
            None => {
                let event = self
                    .store
                    .create_event(
                        &hospital,
                        fp,
                        &canonical,
                        &verdict.title,
                        &verdict.reason,
                        &article.source,
                        severity,
                        &sentiment_id,
                        now,
                    )
                    .await?;
                (event.id, false, true)
            }
            Some(event) => {
                let prior_severity = event.last_severity();
                let updated = self
                    .store
                    .touch_event(
                        event.id,
                        &verdict.title,
                        &verdict.reason,
                        &article.source,
                        severity,
                        &sentiment_id,
                        now,
                    )
                    .await?;
                let escalated = verdict.severity == Severity::High && prior_severity < Severity::High;
                (updated.id, true, escalated)
            }
        };

        self.store
            .insert_sentiment(
                &sentiment_id,
                Some(event_id),
                &hospital,
                &verdict.title,
                &article.source,
                &article.body,
                &verdict.reason,
                severity,
                &canonical,
                is_duplicate,
            )
            .await?;

        Ok(AggregationResult {
            sentiment_id,
            event_id: Some(event_id),
            is_duplicate,
            should_notify,
        })
    }
}
