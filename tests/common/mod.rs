// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tech_watch::config::{CategoryConfig, FeedsByLanguage};
use tech_watch::digest::Digest;
use tech_watch::ingest::types::FeedFetcher;
use tech_watch::notify::Notifier;
use tech_watch::store::RecordSink;
use tech_watch::ArticleRecord;

pub const AWS_XML: &str = include_str!("../fixtures/aws_rss.xml");
pub const LMI_XML: &str = include_str!("../fixtures/lmi_rss.xml");
pub const K8S_XML: &str = include_str!("../fixtures/k8s_atom.xml");
pub const RDF_XML: &str = include_str!("../fixtures/rdf.xml");
pub const MANY_XML: &str = include_str!("../fixtures/many_untitled_feed.xml");

pub const AWS_URL: &str = "https://aws.test/blogs/aws/feed/";
pub const LMI_URL: &str = "https://lmi.test/cloud/rss.xml";
pub const K8S_URL: &str = "https://k8s.test/feed.xml";
pub const RDF_URL: &str = "https://rdf.test/index.rdf";
pub const MANY_URL: &str = "https://many.test/rss";
pub const DOWN_URL: &str = "https://down.test/rss";
pub const HTML_URL: &str = "https://html.test/";

/// Monday 19 Oct 2026, 08:00 local time; cutoff is a week earlier.
pub fn run_clock() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
        .single()
        .expect("unambiguous local time")
}

/// Serves fixtures by url; unknown urls fail like an unreachable host.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    /// All fixtures under their canonical urls.
    pub fn standard() -> Self {
        Self::new()
            .with(AWS_URL, AWS_XML)
            .with(LMI_URL, LMI_XML)
            .with(K8S_URL, K8S_XML)
            .with(RDF_URL, RDF_XML)
            .with(MANY_URL, MANY_XML)
            .with(HTML_URL, "<html><body>Not a feed</body></html>")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {url}"))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// In-memory store keyed by url.
#[derive(Default)]
pub struct MemorySink {
    urls: Mutex<HashSet<String>>,
    pub created: Mutex<Vec<ArticleRecord>>,
    pub exists_calls: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preloaded(urls: &[&str]) -> Self {
        let s = Self::default();
        s.urls
            .lock()
            .unwrap()
            .extend(urls.iter().map(|u| u.to_string()));
        s
    }

    pub fn created(&self) -> Vec<ArticleRecord> {
        self.created.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        *self.exists_calls.lock().unwrap() + self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn exists(&self, url: &str) -> Result<bool> {
        *self.exists_calls.lock().unwrap() += 1;
        Ok(self.urls.lock().unwrap().contains(url))
    }

    async fn create(&self, record: &ArticleRecord) -> Result<()> {
        self.urls.lock().unwrap().insert(record.url.clone());
        self.created.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Keeps every digest it is asked to send; optionally fails.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Digest>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Digest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        self.sent.lock().unwrap().push(digest.clone());
        if self.fail {
            return Err(anyhow!("535 authentication failed"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn category(name: &str, primary: &[&str], secondary: &[&str], keywords: &[&str]) -> CategoryConfig {
    CategoryConfig {
        name: name.to_string(),
        emoji: None,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        feeds: FeedsByLanguage {
            primary: primary.iter().map(|u| u.to_string()).collect(),
            secondary: secondary.iter().map(|u| u.to_string()).collect(),
        },
    }
}
