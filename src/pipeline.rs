// src/pipeline.rs
//! One run: collect every category -> store -> render -> notify.

use anyhow::Result;
use chrono::{DateTime, Local};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::config::Config;
use crate::digest::DigestRenderer;
use crate::ingest::http::HttpFetcher;
use crate::ingest::types::{ArticleRecord, FeedFetcher};
use crate::ingest::{collect, FeedOutcome, FeedReport};
use crate::notify::{EmailNotifier, Notifier, NotifyOutcome, SkipReason};
use crate::store::{store_all, NotionSink, RecordSink, StoreFailure};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("notify_sent_total", "Digests handed to the notifier successfully.");
        describe_counter!("notify_errors_total", "Digests the notifier failed to send.");
    });
}

/// Whether the storage stage ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    Ran,
    NotConfigured,
    NotNeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub name: String,
    pub collected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub collected: usize,
    pub added: usize,
    pub duplicates: usize,
    pub storage: StorageStatus,
    pub notified: NotifyOutcome,
    pub categories: Vec<CategoryStats>,
    pub feed_failures: Vec<FeedReport>,
    pub store_failures: Vec<StoreFailure>,
}

pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn FeedFetcher>,
    sink: Option<Arc<dyn RecordSink>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Pipeline {
    /// No sink, no notifier: both stages report `NotConfigured` until attached.
    pub fn new(config: Config, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            config,
            fetcher,
            sink: None,
            notifier: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Production wiring: HTTP feeds, Notion when a key is present, SMTP when mail settings are complete.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout_secs(config.collect.http_timeout_secs)?;
        let sink = match config.notion.api_key.clone() {
            Some(key) => {
                let sink = NotionSink::new(key, config.notion.database_id.clone())
                    .with_timeout(config.collect.http_timeout_secs)?;
                Some(Arc::new(sink) as Arc<dyn RecordSink>)
            }
            None => None,
        };
        let notifier = match config.email.as_ref().map(EmailNotifier::new) {
            Some(Ok(n)) => Some(Arc::new(n) as Arc<dyn Notifier>),
            Some(Err(e)) => {
                tracing::error!(target: "notify", error = ?e, "email notifier unusable");
                None
            }
            None => None,
        };

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            sink,
            notifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn collect_all(&self, now: DateTime<Local>) -> (Vec<ArticleRecord>, Vec<CategoryStats>, Vec<FeedReport>) {
        let mut records = Vec::new();
        let mut stats = Vec::with_capacity(self.config.categories.len());
        let mut failures = Vec::new();

        for category in &self.config.categories {
            tracing::info!(target: "pipeline", category = %category.name, "collecting");
            let c = collect(category, self.fetcher.as_ref(), &self.config.collect, now).await;
            tracing::info!(target: "pipeline", category = %category.name, found = c.records.len(), "collected");

            stats.push(CategoryStats {
                name: category.name.clone(),
                collected: c.records.len(),
            });
            failures.extend(
                c.feeds
                    .into_iter()
                    .filter(|f| matches!(f.outcome, FeedOutcome::Failed { .. })),
            );
            records.extend(c.records);
        }
        (records, stats, failures)
    }

    async fn notify(&self, records: &[ArticleRecord], added: usize, now: DateTime<Local>) -> NotifyOutcome {
        let Some(notifier) = &self.notifier else {
            tracing::error!(target: "notify", "email configuration incomplete; digest not sent");
            return NotifyOutcome::Skipped(SkipReason::NotConfigured);
        };

        ensure_metrics_described();
        let digest = DigestRenderer::from_config(&self.config, now.date_naive()).render(records, added);
        match notifier.send(&digest).await {
            Ok(()) => {
                tracing::info!(target: "notify", notifier = notifier.name(), "digest sent");
                counter!("notify_sent_total").increment(1);
                NotifyOutcome::Sent
            }
            Err(e) => {
                tracing::error!(target: "notify", notifier = notifier.name(), error = ?e, "digest not sent");
                counter!("notify_errors_total").increment(1);
                NotifyOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    /// Run once. Never fails: every stage outcome lands in the report.
    pub async fn run(&self, now: DateTime<Local>) -> RunReport {
        let (records, categories, feed_failures) = self.collect_all(now).await;
        let collected = records.len();
        tracing::info!(target: "pipeline", collected, "collection done");

        let mut report = RunReport {
            collected,
            added: 0,
            duplicates: 0,
            storage: StorageStatus::NotNeeded,
            notified: NotifyOutcome::Skipped(SkipReason::NothingCollected),
            categories,
            feed_failures,
            store_failures: Vec::new(),
        };

        if records.is_empty() {
            tracing::info!(target: "pipeline", "no new article to add");
            return report;
        }

        match &self.sink {
            Some(sink) => {
                let s = store_all(sink.as_ref(), &records).await;
                report.storage = StorageStatus::Ran;
                report.added = s.added;
                report.duplicates = s.duplicates;
                report.store_failures = s.failures;
                tracing::info!(target: "pipeline", added = s.added, duplicates = s.duplicates, "storage done");
            }
            None => {
                tracing::error!(target: "store", "NOTION_API_KEY not set; storage skipped");
                report.storage = StorageStatus::NotConfigured;
            }
        }

        report.notified = if report.added > 0 {
            // digest covers everything collected, not only what was added
            self.notify(&records, report.added, now).await
        } else {
            NotifyOutcome::Skipped(SkipReason::NothingAdded)
        };
        report
    }
}
