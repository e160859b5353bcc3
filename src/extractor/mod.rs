mod html;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::Browser;
use regex::Regex;
use scraper::{Html, Selector};
use tokio::sync::Semaphore;
use tracing::warn;
use url::Url;

use crate::domain::{extract_hospital_from_subject, Article, RawMail, UNKNOWN_HOSPITAL};

const BODY_BYTE_CAP: usize = 20_000;
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(20);
const N_RETRY: u32 = 2;

/// One shared headless Chrome process, tabs gated by a semaphore so at most
/// `concurrency.p_url` pages render at once (§5).
pub struct BrowserPool {
    browser: Browser,
    permits: Arc<Semaphore>,
}

impl BrowserPool {
    pub fn launch(max_concurrency: usize) -> anyhow::Result<Self> {
        let browser = Browser::default()?;
        Ok(Self {
            browser,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    async fn render(&self, url: String) -> anyhow::Result<String> {
        let _permit = self.permits.acquire().await?;
        let browser = self.browser.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let tab = browser.new_tab()?;
            tab.set_default_timeout(PAGE_LOAD_TIMEOUT);
            tab.navigate_to(&url)?;
            tab.wait_until_navigated()?;
            let content = tab.get_content()?;
            let _ = tab.close(true);
            Ok(content)
        })
        .await?
    }

    async fn render_with_retry(&self, url: &str) -> Option<String> {
        for attempt in 0..=N_RETRY {
            match self.render(url.to_string()).await {
                Ok(html) => return Some(html),
                Err(e) => warn!(url, attempt, error = %e, "page render failed"),
            }
        }
        None
    }
}

/// Extracts {hospital, candidate URLs, per-URL article} from one raw mail.
pub async fn extract(mail: &RawMail, vendor_domain: &str, pool: &BrowserPool) -> Vec<Article> {
    let hospital = hospital_from_mail(mail);
    let urls = collect_urls(&mail.body, vendor_domain);

    let mut articles = Vec::with_capacity(urls.len());
    for url in urls {
        let article = match pool.render_with_retry(&url).await {
            Some(html) => {
                let parsed = html::parse_page(&html);
                Article {
                    hospital: hospital.clone(),
                    source: source_label(&url),
                    title: parsed.title,
                    url: url.clone(),
                    body: html::truncate_bytes(&parsed.body, BODY_BYTE_CAP),
                    degraded: false,
                }
            }
            None => Article {
                hospital: hospital.clone(),
                source: source_label(&url),
                title: String::new(),
                url: url.clone(),
                body: String::new(),
                degraded: true,
            },
        };
        articles.push(article);
    }
    articles
}

/// Prefers a labelled "医院：..." / "Hospital:" line in the body; falls back
/// to the subject-line regex patterns; never fails, worst case "未知".
fn hospital_from_mail(mail: &RawMail) -> String {
    static LABEL: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
        Regex::new(r"(?im)^\s*(?:医院|hospital)\s*[:：]\s*(.+)$").unwrap()
    });

    if let Some(caps) = LABEL.captures(&mail.body) {
        let name = caps[1].trim();
        if !name.is_empty() {
            return crate::domain::normalize_hospital(name);
        }
    }

    let from_subject = extract_hospital_from_subject(&mail.subject);
    if from_subject != UNKNOWN_HOSPITAL {
        from_subject
    } else {
        UNKNOWN_HOSPITAL.to_string()
    }
}

/// Pulls every absolute URL referenced from anchor tags or raw text, keeps
/// only those on the configured vendor domain, and deduplicates.
fn collect_urls(body: &str, vendor_domain: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let mut push_if_vendor = |raw: &str| {
        if let Ok(url) = Url::parse(raw) {
            if url
                .host_str()
                .is_some_and(|h| h == vendor_domain || h.ends_with(&format!(".{vendor_domain}")))
            {
                let s = url.to_string();
                if seen.insert(s.clone()) {
                    out.push(s);
                }
            }
        }
    };

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        let document = Html::parse_fragment(body);
        for el in document.select(&anchor_selector) {
            if let Some(href) = el.value().attr("href") {
                push_if_vendor(href);
            }
        }
    }

    static URL_RE: once_cell::sync::Lazy<Regex> =
        once_cell::sync::Lazy::new(|| Regex::new(r"https?://[^\s<>\x22']+").unwrap());
    for m in URL_RE.find_iter(body) {
        push_if_vendor(m.as_str());
    }

    out
}

fn source_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_string())
}
