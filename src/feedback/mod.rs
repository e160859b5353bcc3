use std::collections::HashMap;

use chrono::{Duration, Utc};
use tracing::info;

use crate::configuration::FeedbackSettings;
use crate::notifier::verify_feedback_link;
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("signature invalid or expired")]
    InvalidSignature,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Verifies the HMAC + expiry on a signed feedback link, records the
/// Feedback row, and flips the sentiment's status.
pub async fn on_feedback(
    store: &Store,
    feedback: &FeedbackSettings,
    queue_id: u64,
    sentiment_id: &str,
    expiry_unix: i64,
    signature: &str,
    judgement: bool,
    feedback_type: &str,
    text: Option<&str>,
) -> Result<(), FeedbackError> {
    if Utc::now().timestamp() > expiry_unix {
        return Err(FeedbackError::InvalidSignature);
    }
    let secret = secrecy::ExposeSecret::expose_secret(&feedback.link_secret);
    if !verify_feedback_link(secret, queue_id, sentiment_id, expiry_unix, signature) {
        return Err(FeedbackError::InvalidSignature);
    }

    let now = Utc::now().naive_utc();
    store
        .resolve_feedback(queue_id, judgement, feedback_type, text, now)
        .await?;

    let (status, dismissed_at) = if judgement {
        ("active", None)
    } else {
        ("dismissed", Some(now))
    };
    store.set_sentiment_status(sentiment_id, status, dismissed_at).await?;
    Ok(())
}

const STOPWORDS: &[&str] = &["the", "a", "an", "of", "in", "on", "for", "and", "is", "to"];
const NGRAM_LEN: usize = 2;

fn ngrams(text: &str) -> Vec<String> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(&t.as_str()))
        .collect();

    tokens
        .windows(NGRAM_LEN)
        .map(|w| w.join(" "))
        .collect()
}


/// Promotes n-grams that recur across at least `min_support` false-positive
/// feedback items into suppress rules. Idempotent: `upsert_feedback_rule`
/// already treats a duplicate `(pattern, rule_type, action)` as a no-op, and
/// this never touches rows with `source_feedback_id = NULL` (manually
/// authored suppress keywords live in a separate table entirely).
pub async fn compile_rules(store: &Store, min_support: u32) -> Result<usize, StoreError> {
    let since = Utc::now().naive_utc() - Duration::days(14);
    let false_positives = store.recent_false_positive_feedback(since).await?;
    let confirmed = store.recent_confirmed_negative_feedback(since).await?;

    let confirmed_grams: std::collections::HashSet<String> = confirmed
        .iter()
        .flat_map(|(_, title, reason)| ngrams(&format!("{title} {reason}")))
        .collect();

    let mut counts: HashMap<String, u32> = HashMap::new();
    for (_, title, reason) in &false_positives {
        let text = format!("{title} {reason}");
        for gram in ngrams(&text).into_iter().collect::<std::collections::HashSet<_>>() {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }

    let mut promoted = 0;
    for (pattern, support) in counts {
        if support < min_support || confirmed_grams.contains(&pattern) {
            continue;
        }
        let confidence = support as f64 / (support as f64 + 1.0);
        let outcome = store
            .upsert_feedback_rule(&pattern, "ngram", "suppress", confidence, None)
            .await?;
        if matches!(outcome, crate::store::UpsertOutcome::Inserted(_)) {
            promoted += 1;
        }
    }

    if promoted > 0 {
        info!(promoted, "compiled new suppression rules from feedback");
    }
    Ok(promoted)
}
