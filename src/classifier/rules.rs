use regex::Regex;

use crate::store::FeedbackRuleRow;

/// One enabled suppression/downgrade rule, pre-compiled once per classify
/// pass. A literal pattern is matched as a case-insensitive substring; a
/// pattern starting and ending with `/` is treated as a regex body.
pub struct CompiledRule {
    pub action: String,
    pub pattern: String,
    matcher: Matcher,
}

enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl CompiledRule {
    pub fn compile(row: &FeedbackRuleRow) -> Option<Self> {
        if !row.enabled {
            return None;
        }
        let matcher = if let Some(body) = row
            .pattern
            .strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
        {
            Regex::new(body).ok().map(Matcher::Regex)?
        } else {
            Matcher::Literal(row.pattern.to_lowercase())
        };
        Some(Self {
            action: row.action.clone(),
            pattern: row.pattern.clone(),
            matcher,
        })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(haystack),
        }
    }
}

/// Plain keyword matching for the admin-managed suppress list (§4.8), kept
/// distinct from compiled FeedbackRules per the spec's explicit instruction
/// to preserve both concepts.
pub fn matches_suppress_keyword(haystack: &str, keywords: &[String]) -> Option<String> {
    let lower = haystack.to_lowercase();
    keywords
        .iter()
        .find(|k| lower.contains(&k.to_lowercase()))
        .cloned()
}
