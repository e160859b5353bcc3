use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::store::{SentimentFilter, SentimentRow, Store, StoreError};

pub struct ReportBundle {
    pub hospital: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Sentiments grouped by event id; `None` holds sentiments that were
    /// never linked to an event (shouldn't happen in practice, but the
    /// aggregator's contract doesn't make it impossible).
    pub by_event: BTreeMap<Option<u64>, Vec<SentimentRow>>,
}

pub async fn build_report_bundle(
    store: &Store,
    hospital: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ReportBundle, StoreError> {
    let filter = SentimentFilter {
        hospital: Some(hospital.to_string()),
        since: Some(start.and_hms_opt(0, 0, 0).unwrap()),
        until: Some(end.and_hms_opt(23, 59, 59).unwrap()),
        limit: 10_000,
        ..Default::default()
    };
    let sentiments = store.list_sentiments(&filter).await?;

    let mut by_event: BTreeMap<Option<u64>, Vec<SentimentRow>> = BTreeMap::new();
    let (mut high, mut medium, mut low) = (0, 0, 0);
    for sentiment in sentiments {
        match sentiment.severity() {
            crate::domain::Severity::High => high += 1,
            crate::domain::Severity::Medium => medium += 1,
            crate::domain::Severity::Low => low += 1,
        }
        by_event.entry(sentiment.event_id).or_default().push(sentiment);
    }

    let total = high + medium + low;
    Ok(ReportBundle {
        hospital: hospital.to_string(),
        start,
        end,
        total,
        high,
        medium,
        low,
        by_event,
    })
}

pub fn render_markdown(bundle: &ReportBundle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Reputation report: {}", bundle.hospital);
    let _ = writeln!(out, "\n{} to {}\n", bundle.start, bundle.end);
    let _ = writeln!(out, "| Severity | Count |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| high | {} |", bundle.high);
    let _ = writeln!(out, "| medium | {} |", bundle.medium);
    let _ = writeln!(out, "| low | {} |", bundle.low);
    let _ = writeln!(out, "| **total** | **{}** |\n", bundle.total);

    for (event_id, sentiments) in &bundle.by_event {
        let heading = match event_id {
            Some(id) => format!("## Event {id}"),
            None => "## Unlinked sentiments".to_string(),
        };
        let _ = writeln!(out, "{heading}\n");
        for s in sentiments {
            let _ = writeln!(out, "- **[{}]** {} — {} ({})", s.severity, s.title, s.reason, s.url);
        }
        let _ = writeln!(out);
    }

    out
}

fn slugify(s: &str) -> String {
    static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());
    NON_ALNUM.replace_all(s, "-").trim_matches('-').to_lowercase()
}

/// `{hospital-slug}-{start}-{end}-{short-hash}.md`; the hash covers the
/// content so two runs over an unchanged range produce the same filename.
pub fn report_filename(bundle: &ReportBundle, rendered: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rendered.as_bytes());
    let hash = hex::encode(hasher.finalize());
    format!(
        "{}-{}-{}-{}.md",
        slugify(&bundle.hospital),
        bundle.start,
        bundle.end,
        &hash[..8]
    )
}

pub async fn write_report(output_dir: &str, bundle: &ReportBundle) -> Result<String, std::io::Error> {
    let rendered = render_markdown(bundle);
    let filename = report_filename(bundle, &rendered);
    tokio::fs::create_dir_all(output_dir).await?;
    let path = Path::new(output_dir).join(&filename);
    tokio::fs::write(path, rendered).await?;
    Ok(filename)
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("filename does not match the generated report naming pattern")]
    InvalidFilename,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rejects path traversal by validating the requested name against the same
/// pattern `report_filename` produces, then resolving strictly inside
/// `output_dir` — never joining a caller-supplied path directly.
pub fn resolve_report_path(output_dir: &str, filename: &str) -> Result<PathBuf, DownloadError> {
    // `report_filename` only ever emits `[a-z0-9-]` plus a literal ".md"
    // suffix; reject anything else outright, which also rules out any "/"
    // or ".." that could escape `output_dir`.
    static PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+-[0-9a-f]{8}\.md$").unwrap());
    if !PATTERN.is_match(filename) {
        return Err(DownloadError::InvalidFilename);
    }
    Ok(Path::new(output_dir).join(filename))
}
