//! tech-watch binary entrypoint.
//! Loads configuration, runs the pipeline once, logs the run report.

use chrono::Local;
use tech_watch::{Config, Pipeline, DEFAULT_LOG_FILTER};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let now = Local::now();
    tracing::info!(date = %now.format("%d/%m/%Y %H:%M"), "tech watch starting");

    let config = Config::load()?;
    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run(now).await;

    for f in &report.feed_failures {
        tracing::warn!(url = %f.url, outcome = ?f.outcome, "feed skipped");
    }
    for f in &report.store_failures {
        tracing::warn!(url = %f.url, reason = %f.reason, "article not stored");
    }
    tracing::info!(
        collected = report.collected,
        added = report.added,
        duplicates = report.duplicates,
        storage = ?report.storage,
        notified = ?report.notified,
        "done"
    );
    Ok(())
}
