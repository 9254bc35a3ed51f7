use anyhow::{Context, Result, ensure};
use clap::Parser; // for cli
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use portal_mailer::cache::{MemoryCache, cache_sweeper};
use portal_mailer::config::Args;
use portal_mailer::handlers::router;
use portal_mailer::models::FeedbackMail;
use portal_mailer::rate_limit::RateLimitedAction;
use portal_mailer::state::AppState;
use portal_mailer::worker::mail_worker;

// stdout plus a plain-text file that the log viewer reads back
fn init_logging(log_file: &Path) -> Result<WorkerGuard> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .context("log file path has no file name")?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<()> {
    // parse cli arguments
    let args = Args::parse();
    ensure!(args.cooldown_window_ms > 0, "--cooldown-window-ms must be positive");
    ensure!(args.sweep_interval > 0, "--sweep-interval must be positive");
    ensure!(args.mail_queue > 0, "--mail-queue must be positive");
    let _log_guard = init_logging(&args.log_file)?;

    let (mail_tx, mail_rx) = mpsc::channel::<FeedbackMail>(args.mail_queue);

    let cache = MemoryCache::new();
    let limiter = RateLimitedAction::new(
        Arc::new(cache.clone()),
        Duration::from_millis(args.store_timeout_ms),
    );

    // creating shared state
    let state = Arc::new(AppState {
        limiter,
        cooldown_window: Duration::from_millis(args.cooldown_window_ms),
        mail_tx,
        mail_from: args.mail_from.clone(),
        mail_to: args.recipients(),
        mail_subject: args.mail_subject.clone(),
        log_file: args.log_file.clone(),
        log_max_lines: args.log_max_lines,
    });

    // spawn the background workers
    tokio::spawn(mail_worker(
        mail_rx,
        reqwest::Client::new(),
        args.mail_relay_url.clone(),
    ));
    tokio::spawn(cache_sweeper(
        cache,
        Duration::from_secs(args.sweep_interval),
    ));

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Portal mailer running on http://localhost:{}", args.port);
    info!(
        "Contact cooldown: one message per {} ms per user",
        args.cooldown_window_ms
    );
    info!(log_file = %args.log_file.display(), "Serving logs");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
