use std::collections::BTreeMap;
use std::collections::HashSet;

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("could not parse url: {0}")]
    Parse(#[from] url::ParseError),
}

/// Canonicalize a URL for fingerprinting: lower-case scheme and host, strip
/// default ports, drop the fragment, strip tracking query parameters, and
/// preserve the path plus the remaining query keys in sorted order.
///
/// Idempotent: `canonicalize_url(canonicalize_url(u)) == canonicalize_url(u)`
/// (invariant P7), because every step it performs is itself a fixed point
/// (lower-casing, dropping, and re-sorting are all stable under repetition).
pub fn canonicalize_url(
    raw: &str,
    tracking_params: &HashSet<String>,
) -> Result<String, UrlError> {
    let mut url = Url::parse(raw)?;

    let scheme = url.scheme().to_ascii_lowercase();
    url.set_scheme(&scheme).ok();

    if let Some(host) = url.host_str() {
        let host = host.to_ascii_lowercase();
        url.set_host(Some(&host))?;
    }

    if is_default_port(&scheme, url.port()) {
        url.set_port(None).ok();
    }

    url.set_fragment(None);

    let kept: BTreeMap<String, String> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k, tracking_params))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let query = kept
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    Ok(url.to_string())
}

fn is_default_port(
    scheme: &str,
    port: Option<u16>,
) -> bool {
    matches!(
        (scheme, port),
        ("http", Some(80)) | ("https", Some(443)) | ("ftp", Some(21))
    )
}

fn is_tracking_param(
    key: &str,
    tracking_params: &HashSet<String>,
) -> bool {
    if tracking_params.contains(key) {
        return true;
    }
    // `utm_*` is always stripped regardless of the configured set, since it is
    // the single most common tracking prefix across vendor redirect links.
    key.starts_with("utm_")
}
