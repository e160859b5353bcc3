use scraper::{Html, Selector};

/// Structural selectors tried in order; the first one that yields non-empty
/// text wins. Falls back to the whole document's text nodes when none match,
/// mirroring sites that don't use a conventional content wrapper.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".content",
    "#content",
    ".main-content",
    ".post-content",
    ".entry-content",
];

const TITLE_SELECTORS: &[&str] = &["h1", "title", "meta[property=\"og:title\"]"];

pub struct ParsedPage {
    pub title: String,
    pub body: String,
}

pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = TITLE_SELECTORS
        .iter()
        .find_map(|sel| extract_title(&document, sel))
        .unwrap_or_default();

    let body = CONTENT_SELECTORS
        .iter()
        .find_map(|sel| extract_text(&document, sel))
        .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" "));

    ParsedPage {
        title: collapse_whitespace(&title),
        body: collapse_whitespace(&body),
    }
}

fn extract_title(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let element = document.select(&selector).next()?;
    if selector_str.starts_with("meta") {
        element.value().attr("content").map(str::to_owned)
    } else {
        let text = element.text().collect::<Vec<_>>().join(" ");
        (!text.trim().is_empty()).then_some(text)
    }
}

fn extract_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text = document
        .select(&selector)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.trim().is_empty()).then_some(text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte-safe truncation to a UTF-8 char boundary, appending an ellipsis when
/// the input was actually cut.
pub fn truncate_bytes(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
