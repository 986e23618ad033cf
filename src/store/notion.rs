// src/store/notion.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::RecordSink;
use crate::ingest::truncate_chars;
use crate::ingest::types::ArticleRecord;

pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Defaults for fields this job never sets itself.
pub const DEFAULT_STATUS: &str = "📥 À lire";
pub const DEFAULT_PRIORITY: &str = "⚡ Moyenne";

const MAX_TITLE_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// Notion database used as an idempotent record store (identity = `URL` property).
#[derive(Clone)]
pub struct NotionSink {
    api_url: String,
    api_key: String,
    database_id: String,
    client: Client,
}

impl NotionSink {
    pub fn new(api_key: String, database_id: String) -> Self {
        Self {
            api_url: NOTION_API_URL.to_string(),
            api_key,
            database_id,
            client: Client::new(),
        }
    }

    /// Point at another API root (proxies, tests).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Result<Self> {
        self.client = Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .context("building notion http client")?;
        Ok(self)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
    }
}

/// Filter body for the by-url existence query.
pub fn url_filter(url: &str) -> Value {
    json!({
        "filter": {
            "property": "URL",
            "url": { "equals": url }
        }
    })
}

/// Page creation body for one record.
pub fn page_payload(database_id: &str, record: &ArticleRecord) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Titre": {
                "title": [{ "text": { "content": truncate_chars(&record.title, MAX_TITLE_CHARS) } }]
            },
            "URL": { "url": record.url },
            "Catégorie": { "select": { "name": record.category } },
            "Source": {
                "rich_text": [{ "text": { "content": record.source } }]
            },
            "Date Ajout": { "date": { "start": record.date.format("%Y-%m-%d").to_string() } },
            "Statut": { "select": { "name": DEFAULT_STATUS } },
            "Priorité": { "select": { "name": DEFAULT_PRIORITY } },
            "Résumé": {
                "rich_text": [{ "text": { "content": record.summary } }]
            }
        }
    })
}

#[async_trait]
impl RecordSink for NotionSink {
    async fn exists(&self, url: &str) -> Result<bool> {
        let rsp = self
            .post(&format!("/databases/{}/query", self.database_id))
            .json(&url_filter(url))
            .send()
            .await
            .context("notion query")?
            .error_for_status()
            .context("notion query non-2xx")?;
        let body: QueryResponse = rsp.json().await.context("notion query body")?;
        Ok(!body.results.is_empty())
    }

    async fn create(&self, record: &ArticleRecord) -> Result<()> {
        let rsp = self
            .post("/pages")
            .json(&page_payload(&self.database_id, record))
            .send()
            .await
            .context("notion create page")?;
        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("notion create page HTTP {status}: {body}"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "notion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Language;
    use chrono::NaiveDate;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: format!("🇬🇧 {}", "t".repeat(2500)),
            url: "https://aws.test/lambda".into(),
            summary: "Pricing update".into(),
            source: "AWS News Blog".into(),
            category: "Cloud".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            language: Language::Secondary,
        }
    }

    #[test]
    fn payload_carries_every_property() {
        let v = page_payload("db-1", &record());
        assert_eq!(v["parent"]["database_id"], "db-1");
        let p = &v["properties"];
        let title = p["Titre"]["title"][0]["text"]["content"].as_str().unwrap();
        assert_eq!(title.chars().count(), 2000);
        assert_eq!(p["URL"]["url"], "https://aws.test/lambda");
        assert_eq!(p["Catégorie"]["select"]["name"], "Cloud");
        assert_eq!(p["Source"]["rich_text"][0]["text"]["content"], "AWS News Blog");
        assert_eq!(p["Date Ajout"]["date"]["start"], "2026-10-19");
        assert_eq!(p["Statut"]["select"]["name"], DEFAULT_STATUS);
        assert_eq!(p["Priorité"]["select"]["name"], DEFAULT_PRIORITY);
        assert_eq!(p["Résumé"]["rich_text"][0]["text"]["content"], "Pricing update");
    }

    #[test]
    fn filter_matches_on_url_property() {
        let v = url_filter("https://x.test/a");
        assert_eq!(v["filter"]["property"], "URL");
        assert_eq!(v["filter"]["url"]["equals"], "https://x.test/a");
    }

    #[test]
    fn timeout_builds_a_client() {
        let s = NotionSink::new("k".into(), "db".into())
            .with_timeout(5)
            .expect("client with timeout");
        assert_eq!(s.database_id, "db");
    }

    #[test]
    fn api_url_trailing_slash_is_dropped() {
        let s = NotionSink::new("k".into(), "db".into()).with_api_url("http://127.0.0.1:9/v1/");
        assert_eq!(s.api_url, "http://127.0.0.1:9/v1");
    }
}
