use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::Severity;

#[derive(Debug, Clone, FromRow)]
pub struct ProcessedMailRow {
    pub id: u64,
    pub token: String,
    pub hospital_name: String,
    pub email_date: NaiveDateTime,
    pub processed_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRow {
    pub id: u64,
    pub hospital_name: String,
    pub fingerprint: i64, // stored as signed BIGINT, reinterpreted as u64 at the boundary
    pub event_url: String,
    pub total_count: i64,
    pub last_title: String,
    pub last_reason: String,
    pub last_source: String,
    pub last_sentiment_id: Option<String>,
    pub last_severity: String,
    pub created_at: NaiveDateTime,
    pub last_seen_at: NaiveDateTime,
    // NULL once closed; see migrations/0001_init.sql for why this (not a
    // plain bool) is what makes the uniqueness backstop work in MySQL.
    pub open_marker: Option<i8>,
}

impl EventRow {
    pub fn fingerprint_u64(&self) -> u64 {
        self.fingerprint as u64
    }

    pub fn is_open(&self) -> bool {
        self.open_marker.is_some()
    }

    pub fn last_severity(&self) -> Severity {
        self.last_severity.parse().unwrap()
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SentimentRow {
    pub id: u64,
    pub sentiment_id: String,
    pub event_id: Option<u64>,
    pub hospital_name: String,
    pub title: String,
    pub source: String,
    pub content: String,
    pub reason: String,
    pub severity: String,
    pub url: String,
    pub status: String,
    pub is_duplicate: bool,
    pub dismissed_at: Option<NaiveDateTime>,
    pub insight: Option<String>,
    pub insight_at: Option<NaiveDateTime>,
    pub processed_at: NaiveDateTime,
}

impl SentimentRow {
    pub fn severity(&self) -> Severity {
        self.severity.parse().unwrap()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FeedbackQueueRow {
    pub id: u64,
    pub user_id: String,
    pub sentiment_id: String,
    pub sent_time: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackRuleRow {
    pub id: u64,
    pub pattern: String,
    pub rule_type: String,
    pub action: String,
    pub confidence: f64,
    pub enabled: bool,
    pub source_feedback_id: Option<u64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SuppressKeywordRow {
    pub id: u64,
    pub keyword: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationQueueRow {
    pub id: u64,
    pub event_id: u64,
    pub sentiment_id: String,
    pub payload: String,
    pub attempts: i32,
}

#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Inserted(u64),
    Existed(u64),
}
