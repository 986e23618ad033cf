// tests/logging.rs
use tech_watch::DEFAULT_LOG_FILTER;
use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

fn with_default_filter<T>(f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::registry().with(EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing::subscriber::with_default(subscriber, f)
}

#[test]
fn stage_targets_log_at_info_by_default() {
    with_default_filter(|| {
        assert!(tracing::enabled!(target: "collect", Level::INFO));
        assert!(tracing::enabled!(target: "store", Level::INFO));
        assert!(tracing::enabled!(target: "notify", Level::INFO));
        assert!(tracing::enabled!(target: "pipeline", Level::INFO));
        assert!(tracing::enabled!(target: "tech_watch::config", Level::INFO));
    });
}

#[test]
fn stage_debug_and_foreign_info_stay_quiet() {
    with_default_filter(|| {
        assert!(!tracing::enabled!(target: "collect", Level::DEBUG));
        assert!(!tracing::enabled!(target: "hyper::client", Level::INFO));
        assert!(tracing::enabled!(target: "hyper::client", Level::WARN));
    });
}
