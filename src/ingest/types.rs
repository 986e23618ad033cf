// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Language label produced by the heuristic classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Primary,
    Secondary,
    Unknown,
}

impl Language {
    /// Glyph prepended to stored titles.
    pub fn glyph(self) -> &'static str {
        match self {
            Language::Primary => "🇫🇷",
            Language::Secondary => "🇬🇧",
            Language::Unknown => "🌐",
        }
    }
}

/// Which configured feed list an entry was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedBucket {
    Primary,
    Secondary,
}

/// One normalized article, built once per qualifying feed entry and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String, // glyph-prefixed, <= 2000 chars
    pub url: String,   // identity key in the store
    pub summary: String,
    pub source: String,
    pub category: String,
    pub date: NaiveDate, // ingestion date
    pub language: Language,
}

/// A parsed feed document, independent of RSS/Atom flavour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<i64>, // unix seconds
    pub updated: Option<i64>,
}

impl FeedEntry {
    /// Publish timestamp, falling back to the update timestamp.
    pub fn timestamp(&self) -> Option<i64> {
        self.published.or(self.updated)
    }
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Return the raw document body served at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
