pub mod llm_client;
mod rules;

use serde::Deserialize;
use tracing::warn;

use crate::domain::{Article, Severity, Verdict};
use crate::store::FeedbackRuleRow;
use llm_client::LlmClient;
use rules::{matches_suppress_keyword, CompiledRule};

#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_negative: bool,
    severity: String,
    reason: String,
    title: String,
    confidence: f32,
}

const PROMPT_TEMPLATE: &str = "\
You are monitoring online reputation for a hospital. Evaluate the article below.

Hospital: {hospital}
Source: {source}
Title: {title}
Body: {body}

Severity rubric:
- low: minor complaint, isolated, no safety implication
- medium: repeated complaint pattern or moderate safety/process concern
- high: serious safety incident, legal/regulatory exposure, or viral negative coverage

Respond with a single JSON object and nothing else, with exactly these fields:
{{\"is_negative\": bool, \"severity\": \"low\"|\"medium\"|\"high\", \"reason\": string, \"title\": string, \"confidence\": number between 0 and 1}}";

fn render_prompt(article: &Article) -> String {
    PROMPT_TEMPLATE
        .replace("{hospital}", &article.hospital)
        .replace("{source}", &article.source)
        .replace("{title}", &article.title)
        .replace("{body}", &article.body)
}

/// Extracts the first top-level `{...}` object from a response that may be
/// wrapped in prose, then parses it into the four required fields.
fn parse_verdict(raw: &str) -> Option<RawVerdict> {
    let start = raw.find('{')?;
    let mut depth = 0i32;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &raw[start..start + offset + ch.len_utf8()];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn normalize(raw: RawVerdict) -> Verdict {
    let severity: Severity = raw.severity.to_lowercase().parse().unwrap_or(Severity::Low);
    Verdict {
        is_negative: raw.is_negative,
        severity,
        reason: raw.reason.trim().to_string(),
        title: raw.title.trim().to_string(),
        confidence: raw.confidence.clamp(0.0, 1.0),
    }
}

fn non_negative(reason: &str, title: &str) -> Verdict {
    Verdict {
        is_negative: false,
        severity: Severity::Low,
        reason: reason.to_string(),
        title: title.to_string(),
        confidence: 0.0,
    }
}

/// Halves confidence and caps severity at `Medium` for an article whose page
/// render timed out or failed (§4.3 edge case: a degraded, near-empty body
/// should never drive a full-confidence high-severity verdict).
fn downgrade_for_degraded(mut verdict: Verdict) -> Verdict {
    verdict.confidence = (verdict.confidence * 0.5).clamp(0.0, 1.0);
    if verdict.severity == Severity::High {
        verdict.severity = Severity::Medium;
    }
    verdict
}

/// Evaluates one article: rule prefilter, admin suppress-keyword check, then
/// (if nothing suppressed it) a call to the LLM.
pub async fn classify(
    article: &Article,
    rule_rows: &[FeedbackRuleRow],
    suppress_keywords: &[String],
    llm: &LlmClient,
) -> Verdict {
    let haystack = format!("{} {}", article.title, article.body);

    let compiled: Vec<CompiledRule> = rule_rows.iter().filter_map(CompiledRule::compile).collect();
    let verdict = if let Some(rule) = compiled
        .iter()
        .find(|r| r.action == "suppress" && r.is_match(&haystack))
    {
        non_negative(&format!("rule:{}", rule.pattern), &article.title)
    } else if let Some(keyword) = matches_suppress_keyword(&haystack, suppress_keywords) {
        non_negative(&format!("suppress_keyword:{keyword}"), &article.title)
    } else if let Some(downgrade) = compiled.iter().find(|r| r.action == "downgrade" && r.is_match(&haystack)) {
        let mut verdict = call_llm(article, llm).await;
        if verdict.severity > Severity::Medium {
            verdict.severity = Severity::Medium;
            verdict.reason = format!("{} (capped by rule:{})", verdict.reason, downgrade.pattern);
        }
        verdict
    } else {
        call_llm(article, llm).await
    };

    if article.degraded {
        downgrade_for_degraded(verdict)
    } else {
        verdict
    }
}


async fn call_llm(article: &Article, llm: &LlmClient) -> Verdict {
    let prompt = render_prompt(article);
    match llm.complete(&prompt).await {
        Ok(raw) => match parse_verdict(&raw) {
            Some(parsed) => normalize(parsed),
            None => {
                warn!(url = %article.url, "llm response failed to parse as a verdict");
                non_negative("parse-error", &article.title)
            }
        },
        Err(e) => {
            warn!(url = %article.url, error = %e, "llm call failed");
            non_negative("parse-error", &article.title)
        }
    }
}
