// src/ingest/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::types::FeedFetcher;

const USER_AGENT: &str = concat!("tech-watch/", env!("CARGO_PKG_VERSION"));

/// Fetches feeds over HTTP(S), one request at a time.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }

    pub fn with_timeout_secs(secs: u64) -> Result<Self> {
        Self::new(Duration::from_secs(secs))
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .send()
            .await
            .context("feed http get()")?
            .error_for_status()
            .context("feed http non-2xx")?
            .text()
            .await
            .context("feed http .text()")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
