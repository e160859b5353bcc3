mod error;
pub mod models;

pub use error::StoreError;
pub use models::*;

use chrono::NaiveDateTime;
use sqlx::error::ErrorKind;
use sqlx::{MySql, MySqlPool, QueryBuilder};

/// Thin wrapper around the connection pool. Every public method is one
/// transaction; callers never see a raw `sqlx::Transaction` or connection.
#[derive(Clone)]
pub struct Store {
    pool: MySqlPool,
}

#[derive(Debug, Default, Clone)]
pub struct SentimentFilter {
    pub hospital: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub query: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct HospitalStats {
    pub hospital_name: String,
    pub total: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
    pub active: i64,
    pub dismissed: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SourceStats {
    pub source: String,
    pub total: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct OverallStats {
    pub total: i64,
    pub high: i64,
    pub active: i64,
    pub dismissed: i64,
    pub avg_score: f64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: i64,
    pub avg_score: f64,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation)
}

impl Store {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ---- processed mail (C2 idempotency) --------------------------------

    pub async fn upsert_processed_mail(
        &self,
        token: &str,
        hospital: &str,
        email_date: NaiveDateTime,
    ) -> Result<UpsertOutcome, StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO processed_mail (token, hospital_name, email_date) VALUES (?, ?, ?)",
        )
        .bind(token)
        .bind(hospital)
        .bind(email_date)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => Ok(UpsertOutcome::Inserted(result.last_insert_id())),
            Err(ref e) if is_unique_violation(e) => {
                let row: (u64,) = sqlx::query_as("SELECT id FROM processed_mail WHERE token = ?")
                    .bind(token)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(UpsertOutcome::Existed(row.0))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_processed_mail_older_than(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM processed_mail WHERE processed_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ---- events (C5 aggregation) -----------------------------------------

    pub async fn find_open_event(
        &self,
        hospital: &str,
        fingerprint: u64,
        window_start: NaiveDateTime,
    ) -> Result<Option<EventRow>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT * FROM events \
             WHERE hospital_name = ? AND fingerprint = ? AND open_marker = 1 AND last_seen_at >= ? \
             LIMIT 1",
        )
        .bind(hospital)
        .bind(fingerprint as i64)
        .bind(window_start)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_event(&self, id: u64) -> Result<EventRow, StoreError> {
        sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Marks any stale open row for this key as closed so a fresh one can be
    /// created without tripping `uq_event_open`. Must run inside the same
    /// caller-held window as `create_event` to avoid racing a concurrent
    /// bump; the in-process keyed mutex in the aggregator is what actually
    /// prevents that race, this is the backstop for when it's bypassed.
    pub async fn close_stale_event(
        &self,
        hospital: &str,
        fingerprint: u64,
        window_start: NaiveDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE events SET open_marker = NULL \
             WHERE hospital_name = ? AND fingerprint = ? AND open_marker = 1 AND last_seen_at < ?",
        )
        .bind(hospital)
        .bind(fingerprint as i64)
        .bind(window_start)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_event(
        &self,
        hospital: &str,
        fingerprint: u64,
        url: &str,
        title: &str,
        reason: &str,
        source: &str,
        severity: &str,
        sentiment_id: &str,
        now: NaiveDateTime,
    ) -> Result<EventRow, StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO events \
             (hospital_name, fingerprint, event_url, total_count, last_title, last_reason, \
              last_source, last_sentiment_id, last_severity, created_at, last_seen_at, open_marker) \
             VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(hospital)
        .bind(fingerprint as i64)
        .bind(url)
        .bind(title)
        .bind(reason)
        .bind(source)
        .bind(sentiment_id)
        .bind(severity)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => self.get_event(result.last_insert_id()).await,
            // Another worker won the race and created the open row first;
            // per the integrity-error policy this is success for the loser,
            // who just reads back the winner's row.
            Err(ref e) if is_unique_violation(e) => self
                .find_open_event(hospital, fingerprint, now)
                .await?
                .ok_or(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn touch_event(
        &self,
        id: u64,
        title: &str,
        reason: &str,
        source: &str,
        severity: &str,
        sentiment_id: &str,
        now: NaiveDateTime,
    ) -> Result<EventRow, StoreError> {
        sqlx::query(
            "UPDATE events SET total_count = total_count + 1, last_title = ?, last_reason = ?, \
             last_source = ?, last_sentiment_id = ?, last_severity = ?, last_seen_at = ? \
             WHERE id = ?",
        )
        .bind(title)
        .bind(reason)
        .bind(source)
        .bind(sentiment_id)
        .bind(severity)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_event(id).await
    }

    pub async fn list_event_sentiments(
        &self,
        event_id: u64,
        limit: i64,
    ) -> Result<Vec<SentimentRow>, StoreError> {
        let rows = sqlx::query_as::<_, SentimentRow>(
            "SELECT * FROM sentiments WHERE event_id = ? ORDER BY processed_at DESC LIMIT ?",
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- sentiments --------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_sentiment(
        &self,
        sentiment_id: &str,
        event_id: Option<u64>,
        hospital: &str,
        title: &str,
        source: &str,
        content: &str,
        reason: &str,
        severity: &str,
        url: &str,
        is_duplicate: bool,
    ) -> Result<SentimentRow, StoreError> {
        sqlx::query(
            "INSERT INTO sentiments \
             (sentiment_id, event_id, hospital_name, title, source, content, reason, severity, \
              url, status, is_duplicate) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', ?)",
        )
        .bind(sentiment_id)
        .bind(event_id)
        .bind(hospital)
        .bind(title)
        .bind(source)
        .bind(content)
        .bind(reason)
        .bind(severity)
        .bind(url)
        .bind(is_duplicate)
        .execute(&self.pool)
        .await?;
        self.get_sentiment(sentiment_id).await
    }

    pub async fn get_sentiment(&self, sentiment_id: &str) -> Result<SentimentRow, StoreError> {
        sqlx::query_as::<_, SentimentRow>("SELECT * FROM sentiments WHERE sentiment_id = ?")
            .bind(sentiment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn set_sentiment_status(
        &self,
        sentiment_id: &str,
        status: &str,
        dismissed_at: Option<NaiveDateTime>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sentiments SET status = ?, dismissed_at = ? WHERE sentiment_id = ?")
            .bind(status)
            .bind(dismissed_at)
            .bind(sentiment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_sentiment_event(
        &self,
        sentiment_id: &str,
        event_id: u64,
        is_duplicate: bool,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sentiments SET event_id = ?, is_duplicate = ? WHERE sentiment_id = ?")
            .bind(event_id)
            .bind(is_duplicate)
            .bind(sentiment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_insight(
        &self,
        sentiment_id: &str,
        insight: &str,
        at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sentiments SET insight = ?, insight_at = ? WHERE sentiment_id = ?")
            .bind(insight)
            .bind(at)
            .bind(sentiment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_sentiments(
        &self,
        filter: &SentimentFilter,
    ) -> Result<Vec<SentimentRow>, StoreError> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new("SELECT * FROM sentiments WHERE 1=1");
        if let Some(h) = &filter.hospital {
            qb.push(" AND hospital_name = ").push_bind(h.clone());
        }
        if let Some(s) = &filter.status {
            qb.push(" AND status = ").push_bind(s.clone());
        }
        if let Some(s) = &filter.severity {
            qb.push(" AND severity = ").push_bind(s.clone());
        }
        if let Some(since) = filter.since {
            qb.push(" AND processed_at >= ").push_bind(since);
        }
        if let Some(until) = filter.until {
            qb.push(" AND processed_at < ").push_bind(until);
        }
        if let Some(q) = &filter.query {
            let pattern = format!("%{q}%");
            qb.push(" AND (title LIKE ").push_bind(pattern.clone());
            qb.push(" OR content LIKE ").push_bind(pattern.clone());
            qb.push(" OR reason LIKE ").push_bind(pattern.clone());
            qb.push(" OR hospital_name LIKE ").push_bind(pattern).push(")");
        }
        qb.push(" ORDER BY processed_at DESC LIMIT ")
            .push_bind(filter.limit.max(1))
            .push(" OFFSET ")
            .push_bind(filter.offset.max(0));

        let rows = qb.build_query_as::<SentimentRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn compute_stats(
        &self,
        hospital: Option<&str>,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<HospitalStats>, StoreError> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT hospital_name, \
             COUNT(*) AS total, \
             SUM(severity = 'high') AS high, \
             SUM(severity = 'medium') AS medium, \
             SUM(severity = 'low') AS low, \
             SUM(status = 'active') AS active, \
             SUM(status = 'dismissed') AS dismissed \
             FROM sentiments WHERE 1=1",
        );
        if let Some(h) = hospital {
            qb.push(" AND hospital_name = ").push_bind(h.to_owned());
        }
        if let Some(s) = since {
            qb.push(" AND processed_at >= ").push_bind(s);
        }
        qb.push(" GROUP BY hospital_name ORDER BY hospital_name");

        let rows = qb
            .build_query_as::<HospitalStats>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// `bucket_format` is a MySQL `DATE_FORMAT` pattern: `%H:00` for the 24h
    /// range, `%m-%d` for 7d/30d, per §4.8's bucketing rule.
    pub async fn trend(
        &self,
        hospital: Option<&str>,
        since_hours: i64,
        bucket_format: &str,
    ) -> Result<Vec<TrendPoint>, StoreError> {
        let score_case = "CASE severity \
             WHEN 'low' THEN 0.35 WHEN 'medium' THEN 0.60 WHEN 'high' THEN 0.92 ELSE 0.35 END";
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new("SELECT DATE_FORMAT(processed_at, ");
        qb.push_bind(bucket_format.to_owned())
            .push(") AS label, COUNT(*) AS count, AVG(")
            .push(score_case)
            .push(") AS avg_score FROM sentiments WHERE processed_at >= DATE_SUB(NOW(), INTERVAL ")
            .push_bind(since_hours)
            .push(" HOUR)");
        if let Some(h) = hospital {
            qb.push(" AND hospital_name = ").push_bind(h.to_owned());
        }
        qb.push(" GROUP BY label ORDER BY MIN(processed_at)");

        let rows = qb.build_query_as::<TrendPoint>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn compute_source_stats(
        &self,
        hospital: Option<&str>,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<SourceStats>, StoreError> {
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT source, COUNT(*) AS total FROM sentiments WHERE 1=1");
        if let Some(h) = hospital {
            qb.push(" AND hospital_name = ").push_bind(h.to_owned());
        }
        if let Some(s) = since {
            qb.push(" AND processed_at >= ").push_bind(s);
        }
        qb.push(" GROUP BY source ORDER BY total DESC");

        let rows = qb.build_query_as::<SourceStats>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn compute_overall_stats(
        &self,
        hospital: Option<&str>,
        since: Option<NaiveDateTime>,
    ) -> Result<OverallStats, StoreError> {
        let score_case = "CASE severity \
             WHEN 'low' THEN 0.35 WHEN 'medium' THEN 0.60 WHEN 'high' THEN 0.92 ELSE 0.35 END";
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT COUNT(*) AS total, \
             SUM(severity = 'high') AS high, \
             SUM(status = 'active') AS active, \
             SUM(status = 'dismissed') AS dismissed, \
             COALESCE(AVG(",
        );
        qb.push(score_case).push("), 0) AS avg_score FROM sentiments WHERE 1=1");
        if let Some(h) = hospital {
            qb.push(" AND hospital_name = ").push_bind(h.to_owned());
        }
        if let Some(s) = since {
            qb.push(" AND processed_at >= ").push_bind(s);
        }

        let row = qb.build_query_as::<OverallStats>().fetch_one(&self.pool).await?;
        Ok(row)
    }

    // ---- feedback (C7) -----------------------------------------------------

    pub async fn enqueue_feedback(
        &self,
        user_id: &str,
        sentiment_id: &str,
        sent_time: NaiveDateTime,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO feedback_queue (user_id, sentiment_id, sent_time, status) \
             VALUES (?, ?, ?, 'pending')",
        )
        .bind(user_id)
        .bind(sentiment_id)
        .bind(sent_time)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    /// Resolves the specific queue row the signed link named (by primary
    /// key, not an inferred `(user_id, sentiment_id)` match) so a sentiment
    /// re-notified before an earlier reminder is answered can't have the
    /// wrong pending row resolved. Fails with `NotFound` if the row is
    /// missing or already left the `pending` state.
    pub async fn resolve_feedback(
        &self,
        queue_id: u64,
        judgement: bool,
        feedback_type: &str,
        text: Option<&str>,
        feedback_time: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let (sentiment_id, user_id): (String, String) = sqlx::query_as(
            "SELECT sentiment_id, user_id FROM feedback_queue WHERE id = ? AND status = 'pending'",
        )
        .bind(queue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        sqlx::query(
            "INSERT INTO feedback (sentiment_id, judgement, type, text, user_id, feedback_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&sentiment_id)
        .bind(judgement)
        .bind(feedback_type)
        .bind(text)
        .bind(&user_id)
        .bind(feedback_time)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE feedback_queue SET status = 'answered' WHERE id = ?")
            .bind(queue_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Marks `pending` queue rows whose `sent_time` is older than `cutoff`
    /// (computed from `feedback.link_ttl_hours`) as `expired`, completing the
    /// `{pending, answered, expired}` lifecycle (§3).
    pub async fn expire_stale_feedback_queue(&self, cutoff: NaiveDateTime) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE feedback_queue SET status = 'expired' WHERE status = 'pending' AND sent_time < ?",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rows behind recent false-positive feedback, joined with the sentiment
    /// text the rule compiler mines for n-grams.
    pub async fn recent_false_positive_feedback(
        &self,
        since: NaiveDateTime,
    ) -> Result<Vec<(String, String, String)>, StoreError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT s.sentiment_id, s.title, s.reason FROM feedback f \
             JOIN sentiments s ON s.sentiment_id = f.sentiment_id \
             WHERE f.judgement = 0 AND f.created_at >= ?",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn recent_confirmed_negative_feedback(
        &self,
        since: NaiveDateTime,
    ) -> Result<Vec<(String, String, String)>, StoreError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT s.sentiment_id, s.title, s.reason FROM feedback f \
             JOIN sentiments s ON s.sentiment_id = f.sentiment_id \
             WHERE f.judgement = 1 AND f.created_at >= ?",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_feedback_rules(
        &self,
        enabled_only: bool,
    ) -> Result<Vec<FeedbackRuleRow>, StoreError> {
        let sql = if enabled_only {
            "SELECT * FROM feedback_rules WHERE enabled = 1"
        } else {
            "SELECT * FROM feedback_rules"
        };
        let rows = sqlx::query_as::<_, FeedbackRuleRow>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn upsert_feedback_rule(
        &self,
        pattern: &str,
        rule_type: &str,
        action: &str,
        confidence: f64,
        source_feedback_id: Option<u64>,
    ) -> Result<UpsertOutcome, StoreError> {
        let inserted = sqlx::query(
            "INSERT INTO feedback_rules (pattern, rule_type, action, confidence, source_feedback_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(pattern)
        .bind(rule_type)
        .bind(action)
        .bind(confidence)
        .bind(source_feedback_id)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => Ok(UpsertOutcome::Inserted(result.last_insert_id())),
            Err(ref e) if is_unique_violation(e) => {
                let row: (u64,) = sqlx::query_as(
                    "SELECT id FROM feedback_rules WHERE pattern = ? AND rule_type = ? AND action = ?",
                )
                .bind(pattern)
                .bind(rule_type)
                .bind(action)
                .fetch_one(&self.pool)
                .await?;
                Ok(UpsertOutcome::Existed(row.0))
            }
            Err(e) => Err(e.into()),
        }
    }

    // ---- suppress keywords ---------------------------------------------

    pub async fn list_suppress_keywords(&self) -> Result<Vec<SuppressKeywordRow>, StoreError> {
        let rows = sqlx::query_as::<_, SuppressKeywordRow>(
            "SELECT * FROM suppress_keywords ORDER BY keyword",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn replace_suppress_keywords(&self, keywords: &[String]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM suppress_keywords")
            .execute(&mut *tx)
            .await?;
        for keyword in keywords {
            sqlx::query("INSERT INTO suppress_keywords (keyword) VALUES (?)")
                .bind(keyword)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // ---- notification queue (C6) ----------------------------------------

    pub async fn enqueue_notification(
        &self,
        event_id: u64,
        sentiment_id: &str,
        payload: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO notification_queue (event_id, sentiment_id, payload) VALUES (?, ?, ?)",
        )
        .bind(event_id)
        .bind(sentiment_id)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    /// Claims the oldest due row with `FOR UPDATE SKIP LOCKED` so concurrent
    /// notifier workers never double-deliver, bumps its attempt counter, and
    /// returns it. The caller deletes the row on success or reschedules it
    /// (via `reschedule_notification`) with a backed-off `next_attempt_at`
    /// on failure.
    pub async fn dequeue_notification(&self) -> Result<Option<NotificationQueueRow>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let claimed: Option<(u64,)> = sqlx::query_as(
            "SELECT id FROM notification_queue WHERE next_attempt_at <= NOW() \
             ORDER BY id LIMIT 1 FOR UPDATE SKIP LOCKED",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id,)) = claimed else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE notification_queue SET attempts = attempts + 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let row = sqlx::query_as::<_, NotificationQueueRow>(
            "SELECT * FROM notification_queue WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(row))
    }

    pub async fn reschedule_notification(
        &self,
        id: u64,
        next_attempt_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE notification_queue SET next_attempt_at = ? WHERE id = ?")
            .bind(next_attempt_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_notification(&self, id: u64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM notification_queue WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
