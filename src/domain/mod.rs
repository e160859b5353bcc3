mod canonical_url;
mod fingerprint;
mod hospital_name;
mod severity;

pub use canonical_url::canonicalize_url;
pub use canonical_url::UrlError;
pub use fingerprint::fingerprint;
pub use hospital_name::extract_hospital_from_subject;
pub use hospital_name::normalize_hospital;
pub use hospital_name::UNKNOWN_HOSPITAL;
pub use severity::Severity;

/// One classified article, before it has been written to the store.
#[derive(Debug, Clone)]
pub struct Article {
    pub hospital: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub body: String,
    /// Set when the page render failed or timed out; downstream classification
    /// treats this as grounds for a lower-confidence verdict rather than an
    /// aborted mail.
    pub degraded: bool,
}

/// The typed output of the Classifier for one article.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub is_negative: bool,
    pub severity: Severity,
    pub reason: String,
    pub title: String,
    pub confidence: f32,
}

/// One message pulled off the mailbox, MIME-decoded but otherwise unprocessed.
#[derive(Debug, Clone)]
pub struct RawMail {
    pub token: String,
    pub subject: String,
    pub body: String,
    pub received_at: chrono::DateTime<chrono::Utc>,
    pub sender: String,
}
