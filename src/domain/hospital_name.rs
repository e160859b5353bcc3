use once_cell::sync::Lazy;
use regex::Regex;

pub const UNKNOWN_HOSPITAL: &str = "未知";

/// Ordered set of patterns tuned for hospital-suffix tokens commonly seen in
/// vendor subject lines. First match wins.
static SUBJECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "XX市第一人民医院" style: city/district + descriptor + hospital suffix
        Regex::new(r"[一-龥]{2,20}(医院|卫生院|诊所|卫生服务中心)").unwrap(),
        // "XX Hospital" / "XX Medical Center" English fallback
        Regex::new(r"(?i)[A-Za-z][A-Za-z .'-]{1,40}(Hospital|Medical Center|Clinic)").unwrap(),
    ]
});

/// Extract a hospital name from a subject line using the ordered pattern set;
/// falls back to `UNKNOWN_HOSPITAL` when nothing matches.
pub fn extract_hospital_from_subject(subject: &str) -> String {
    for pattern in SUBJECT_PATTERNS.iter() {
        if let Some(m) = pattern.find(subject) {
            return m.as_str().trim().to_string();
        }
    }
    UNKNOWN_HOSPITAL.to_string()
}

/// Trim, collapse internal whitespace, and strip administrative suffixes that
/// the extractor sometimes duplicates (e.g. "医院 " with a trailing space, or a
/// repeated branch qualifier), so that two spellings of the same hospital
/// fingerprint identically.
pub fn normalize_hospital(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['（', '(', ')', '）'])
        .trim()
        .to_string()
}
