use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use imap::types::Fetch;
use mailparse::MailHeaderMap;
use secrecy::ExposeSecret;
use sha1::{Digest, Sha1};

use crate::configuration::EmailSettings;
use crate::domain::RawMail;
use crate::store::{Store, UpsertOutcome};

/// Opens one IMAP session, pulls unseen matching mail, and upserts each
/// message's idempotency token before handing back the ones that are new.
/// `imap` is a blocking client, so the whole poll runs inside
/// `spawn_blocking`; only the upsert (async, against the pool) happens on
/// the calling task afterwards.
pub async fn poll(settings: &EmailSettings, store: &Store) -> Result<Vec<RawMail>, anyhow::Error> {
    let host = settings.imap_server.clone();
    let port = settings.imap_port;
    let address = settings.email_address.clone();
    let password = settings.app_password.expose_secret().to_owned();
    let mailbox = settings.mailbox.clone();
    let sender_filter = settings.sender_filter.clone();

    let candidates = tokio::task::spawn_blocking(move || -> Result<Vec<FetchedMail>, anyhow::Error> {
        fetch_unseen(&host, port, &address, &password, &mailbox, &sender_filter)
    })
    .await
    .map_err(|e| anyhow!("imap poll task panicked: {e}"))??;

    let mut fresh = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let hospital = crate::domain::extract_hospital_from_subject(&candidate.raw.subject);
        let outcome = store
            .upsert_processed_mail(
                &candidate.token,
                &hospital,
                candidate.raw.received_at.naive_utc(),
            )
            .await?;
        if matches!(outcome, UpsertOutcome::Inserted(_)) {
            fresh.push(RawMail {
                token: candidate.token,
                ..candidate.raw
            });
        }
    }
    Ok(fresh)
}

struct FetchedMail {
    token: String,
    raw: RawMail,
}

fn fetch_unseen(
    host: &str,
    port: u16,
    address: &str,
    password: &str,
    mailbox: &str,
    sender_filter: &str,
) -> Result<Vec<FetchedMail>, anyhow::Error> {
    let client = imap::ClientBuilder::new(host, port)
        .connect()
        .context("imap connect")?;
    let mut session = client
        .login(address, password)
        .map_err(|e| anyhow!("imap login failed: {}", e.0))?;

    if session.select(mailbox).is_err() {
        let selected = session
            .list(None, Some("*"))
            .context("list mailboxes")?
            .iter()
            .find(|m| m.name().to_ascii_uppercase().contains("INBOX"))
            .map(|m| m.name().to_string())
            .ok_or_else(|| anyhow!("no mailbox matching configured name or INBOX"))?;
        session.select(&selected).context("select fallback mailbox")?;
    }

    let query = format!("UNSEEN FROM \"{sender_filter}\"");
    let uids = session.search(&query).context("imap search")?;
    if uids.is_empty() {
        let _ = session.logout();
        return Ok(Vec::new());
    }

    let seq = uids
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let fetches = session
        .fetch(seq, "UID RFC822")
        .context("imap fetch")?;

    let mut out = Vec::new();
    for fetch in fetches.iter() {
        if let Some(mail) = parse_fetch(fetch) {
            out.push(mail);
        }
    }

    // Never \Seen the messages; re-scans rely on the idempotency token.
    let _ = session.logout();
    Ok(out)
}

fn parse_fetch(fetch: &Fetch) -> Option<FetchedMail> {
    let raw = fetch.body()?;
    let parsed = mailparse::parse_mail(raw).ok()?;

    let subject = parsed.headers.get_first_value("Subject").unwrap_or_default();
    let sender = parsed.headers.get_first_value("From").unwrap_or_default();
    let message_id = parsed.headers.get_first_value("Message-Id").unwrap_or_default();
    let date_header = parsed.headers.get_first_value("Date").unwrap_or_default();
    let received_at = mailparse::dateparse(&date_header)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    let token = match fetch.uid {
        Some(uid) => uid.to_string(),
        None => {
            let mut hasher = Sha1::new();
            hasher.update(message_id.as_bytes());
            hasher.update(date_header.as_bytes());
            hex::encode(hasher.finalize())
        }
    };

    let body = extract_body(&parsed);

    Some(FetchedMail {
        token,
        raw: RawMail {
            token: String::new(), // set by the caller once the idempotency check runs
            subject,
            body,
            received_at,
            sender,
        },
    })
}

/// Prefers text/html (C3 parses structure out of it), falls back to
/// text/plain, applying the part's declared charset with UTF-8 as the last
/// resort.
fn extract_body(parsed: &mailparse::ParsedMail) -> String {
    fn decode(part: &mailparse::ParsedMail) -> Option<String> {
        let bytes = part.get_body_raw().ok()?;
        let charset = part.ctype.params.get("charset").map(String::as_str);
        match charset.and_then(|c| encoding_rs::Encoding::for_label(c.as_bytes())) {
            Some(encoding) => {
                let (decoded, _, _) = encoding.decode(&bytes);
                Some(decoded.into_owned())
            }
            None => String::from_utf8(bytes).ok(),
        }
    }

    fn find<'a>(part: &'a mailparse::ParsedMail, mimetype: &str) -> Option<&'a mailparse::ParsedMail<'a>> {
        if part.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
            return Some(part);
        }
        part.subparts.iter().find_map(|p| find(p, mimetype))
    }

    find(parsed, "text/html")
        .or_else(|| find(parsed, "text/plain"))
        .and_then(decode)
        .unwrap_or_default()
}
