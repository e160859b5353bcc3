use std::fmt::Debug;
use std::fmt::Display;

use tokio::task::JoinError;
use tracing::info;
use sentiwatch::configuration::get_configuration;
use sentiwatch::scheduler::{init_notifier_worker, init_retention_worker, init_rule_compiler_worker, init_scheduler};
use sentiwatch::startup::Application;
use sentiwatch::telemetry::get_subscriber;
use sentiwatch::telemetry::init_subscriber;

fn report_exit(
    name: &str,
    outcome: Result<Result<(), impl Debug + Display>, JoinError>,
) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{name} exited gracefully")
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (inner)"
            )
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (outer)"
            )
        }
    }
}

/// Resolves once SIGINT or (on unix) SIGTERM is received.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialise telemetry, load config, and start the server, the ingestion
/// scheduler, and the background workers side by side.
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("sentiwatch", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration().expect("failed to read configuration");

    let application = Application::build(cfg).await?;
    let ctx = application.context();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let server = application.run_until_stopped();
    let scheduler = init_scheduler(ctx.clone(), shutdown_rx.clone());
    let notifier_worker = init_notifier_worker(ctx.clone(), shutdown_rx.clone());
    let rule_compiler_worker = init_rule_compiler_worker(ctx.clone(), shutdown_rx.clone());
    let retention_worker = init_retention_worker(ctx, shutdown_rx);

    // If `spawn` is not called, all async branches are run on the same
    // thread, and cooperate rather than run in parallel; a hung page fetch in
    // the scheduler would otherwise stall the API too.
    let server_thread = tokio::spawn(server);
    let scheduler_thread = tokio::spawn(scheduler);
    let notifier_thread = tokio::spawn(notifier_worker);
    let rule_compiler_thread = tokio::spawn(rule_compiler_worker);
    let retention_thread = tokio::spawn(retention_worker);

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received, notifying workers");
        let _ = shutdown_tx.send(true);
    });

    tokio::select! {
        o = server_thread => { report_exit("API", o) },
        o = scheduler_thread => { report_exit("Scheduler", o) },
        o = notifier_thread => { report_exit("Notifier worker", o) },
        o = rule_compiler_thread => { report_exit("Rule compiler worker", o) },
        o = retention_thread => { report_exit("Retention worker", o) },
    }

    Ok(())
}
