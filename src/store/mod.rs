// src/store/mod.rs
//! Record persistence behind an idempotent create-by-url seam.

pub mod notion;

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::ingest::types::ArticleRecord;

pub use crate::store::notion::NotionSink;

#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Whether a record with this url is already stored.
    async fn exists(&self, url: &str) -> Result<bool>;
    async fn create(&self, record: &ArticleRecord) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Created,
    Duplicate,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub url: String,
    pub title: String,
    pub reason: String,
}

/// Aggregate of one storage pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub added: usize,
    pub duplicates: usize,
    pub failures: Vec<StoreFailure>,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("store_created_total", "Records created in the store.");
        describe_counter!("store_duplicate_total", "Records already present in the store.");
        describe_counter!("store_errors_total", "Per-record storage failures.");
    });
}

/// Existence check, then create. Never errors: failures become `StoreOutcome::Failed`.
pub async fn store_record(sink: &dyn RecordSink, record: &ArticleRecord) -> StoreOutcome {
    if record.url.trim().is_empty() {
        return StoreOutcome::Failed("record has no url".to_string());
    }
    match sink.exists(&record.url).await {
        Ok(true) => return StoreOutcome::Duplicate,
        Ok(false) => {}
        // creating blind could duplicate; skip the item instead
        Err(e) => return StoreOutcome::Failed(format!("existence check: {e:#}")),
    }
    match sink.create(record).await {
        Ok(()) => StoreOutcome::Created,
        Err(e) => StoreOutcome::Failed(format!("{e:#}")),
    }
}

/// Store every record in order, one call at a time.
pub async fn store_all(sink: &dyn RecordSink, records: &[ArticleRecord]) -> StoreSummary {
    ensure_metrics_described();

    let mut summary = StoreSummary::default();
    for record in records {
        match store_record(sink, record).await {
            StoreOutcome::Created => {
                tracing::info!(target: "store", title = %record.title, "added");
                counter!("store_created_total").increment(1);
                summary.added += 1;
            }
            StoreOutcome::Duplicate => {
                tracing::info!(target: "store", title = %record.title, "already present");
                counter!("store_duplicate_total").increment(1);
                summary.duplicates += 1;
            }
            StoreOutcome::Failed(reason) => {
                tracing::warn!(target: "store", sink = sink.name(), title = %record.title, %reason, "store failed");
                counter!("store_errors_total").increment(1);
                summary.failures.push(StoreFailure {
                    url: record.url.clone(),
                    title: record.title.clone(),
                    reason,
                });
            }
        }
    }
    summary
}
