use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::AppContext;
use crate::domain::RawMail;
use crate::{classifier, feedback, mail, notifier};

/// Sleeps for `duration`, returning early (with `true`) if `shutdown` flips
/// to `true` first. Every worker loop's suspension point goes through this so
/// a shutdown signal is observed between ticks, not just at process exit.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.changed() => true,
    }
}

/// One C2→C3→C4→C5→C6 pass. Articles within one mail classify and
/// aggregate in input order so the "first-seen" Sentiment of an event is
/// reproducible (§5 ordering guarantee); only the C3 page fetch fans out.
async fn run_tick(ctx: &AppContext, shutdown: &watch::Receiver<bool>) -> Result<(), anyhow::Error> {
    if *shutdown.borrow() {
        return Ok(());
    }

    let mails = mail::poll(&ctx.settings.email, &ctx.store).await?;
    if mails.is_empty() {
        return Ok(());
    }
    info!(count = mails.len(), "new mail fetched");

    let p_mail = ctx.settings.concurrency.p_mail;
    stream::iter(mails)
        .for_each_concurrent(p_mail, |mail| async move { process_mail(ctx, &mail, shutdown).await })
        .await;

    Ok(())
}

async fn process_mail(ctx: &AppContext, mail: &RawMail, shutdown: &watch::Receiver<bool>) {
    let articles = crate::extractor::extract(
        mail,
        &ctx.settings.aggregation.vendor_domain,
        &ctx.browser_pool,
    )
    .await;

    let rules = match ctx.store.list_feedback_rules(true).await {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "failed to load feedback rules, classifying with none");
            Vec::new()
        }
    };
    let suppress_keywords = match ctx.store.list_suppress_keywords().await {
        Ok(rows) => rows.into_iter().map(|r| r.keyword).collect::<Vec<_>>(),
        Err(e) => {
            error!(error = %e, "failed to load suppress keywords, classifying with none");
            Vec::new()
        }
    };

    // Deterministic input order, not concurrent: this is what keeps the
    // first-seen Sentiment of an event reproducible.
    for article in &articles {
        if *shutdown.borrow() {
            info!("shutdown observed mid-tick, abandoning remaining articles in this mail");
            break;
        }

        let verdict = classifier::classify(article, &rules, &suppress_keywords, &ctx.llm_client).await;
        let aggregated = match ctx.aggregator.aggregate(article, &verdict).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, url = %article.url, "aggregation failed");
                continue;
            }
        };
        if !aggregated.should_notify {
            continue;
        }
        let Some(event_id) = aggregated.event_id else {
            continue;
        };

        let (event, sentiment) = match futures::try_join!(
            ctx.store.get_event(event_id),
            ctx.store.get_sentiment(&aggregated.sentiment_id)
        ) {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "failed to re-read event/sentiment for notification");
                continue;
            }
        };
        if let Err(e) = notifier::notify(&ctx.store, &ctx.settings.feedback, &event, &sentiment).await {
            warn!(error = %e, "failed to enqueue notification");
        }
    }
}

/// Drives the ingestion tick on `runtime.check_interval_seconds`, until
/// `shutdown` is set, which is checked before each tick and at the sleep
/// between ticks.
pub async fn init_scheduler(ctx: Arc<AppContext>, mut shutdown: watch::Receiver<bool>) -> Result<(), anyhow::Error> {
    let interval = Duration::from_secs(ctx.settings.runtime.check_interval_seconds);
    loop {
        if *shutdown.borrow() {
            info!("scheduler observed shutdown signal, exiting");
            return Ok(());
        }
        if let Err(e) = run_tick(&ctx, &shutdown).await {
            error!(error = %e, "ingestion tick failed");
        }
        if sleep_or_shutdown(interval, &mut shutdown).await {
            info!("scheduler observed shutdown signal, exiting");
            return Ok(());
        }
    }
}

/// Drains the persisted notification queue on a short, fixed cadence,
/// independent of the ingestion tick (§4.6 expansion).
pub async fn init_notifier_worker(ctx: Arc<AppContext>, mut shutdown: watch::Receiver<bool>) -> Result<(), anyhow::Error> {
    loop {
        if *shutdown.borrow() {
            info!("notifier worker observed shutdown signal, exiting");
            return Ok(());
        }
        notifier::drain_once(&ctx.store, &ctx.settings.notification, &ctx.http_client).await;
        if sleep_or_shutdown(Duration::from_secs(10), &mut shutdown).await {
            info!("notifier worker observed shutdown signal, exiting");
            return Ok(());
        }
    }
}

/// Compiles new suppression rules from recent feedback on
/// `runtime.rule_compile_interval_minutes`.
pub async fn init_rule_compiler_worker(ctx: Arc<AppContext>, mut shutdown: watch::Receiver<bool>) -> Result<(), anyhow::Error> {
    let interval = Duration::from_secs(ctx.settings.runtime.rule_compile_interval_minutes * 60);
    loop {
        if *shutdown.borrow() {
            info!("rule compiler worker observed shutdown signal, exiting");
            return Ok(());
        }
        match feedback::compile_rules(&ctx.store, ctx.settings.feedback.compile_min_support).await {
            Ok(n) if n > 0 => info!(promoted = n, "rule compiler promoted new suppression rules"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "rule compilation failed"),
        }
        if sleep_or_shutdown(interval, &mut shutdown).await {
            info!("rule compiler worker observed shutdown signal, exiting");
            return Ok(());
        }
    }
}

/// Deletes `processed_mail` rows older than `runtime.retention_days` and
/// `feedback_queue` rows past their `feedback.link_ttl_hours` window that
/// were never answered; never blocks ingestion (runs on its own hourly
/// cadence).
pub async fn init_retention_worker(ctx: Arc<AppContext>, mut shutdown: watch::Receiver<bool>) -> Result<(), anyhow::Error> {
    loop {
        if *shutdown.borrow() {
            info!("retention worker observed shutdown signal, exiting");
            return Ok(());
        }

        let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(ctx.settings.runtime.retention_days);
        match ctx.store.delete_processed_mail_older_than(cutoff).await {
            Ok(n) if n > 0 => info!(deleted = n, "retention sweep removed old processed-mail rows"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "retention sweep failed"),
        }

        let feedback_cutoff =
            chrono::Utc::now().naive_utc() - chrono::Duration::hours(ctx.settings.feedback.link_ttl_hours);
        match ctx.store.expire_stale_feedback_queue(feedback_cutoff).await {
            Ok(n) if n > 0 => info!(expired = n, "retention sweep expired stale feedback-queue rows"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "feedback-queue expiry sweep failed"),
        }

        if sleep_or_shutdown(Duration::from_secs(3600), &mut shutdown).await {
            info!("retention worker observed shutdown signal, exiting");
            return Ok(());
        }
    }
}
