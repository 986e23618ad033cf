// src/config/feeds.rs
//! Feed table loading: category -> {primary, secondary} -> URLs, plus keywords.
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FEEDS_CONFIG_PATH: &str = "FEEDS_CONFIG_PATH";
pub const DEFAULT_FEEDS_CONFIG_PATH: &str = "config/feeds.toml";

/// Upper bound for `collect.max_age_days` (about a century).
pub const MAX_AGE_DAYS_LIMIT: i64 = 36_500;

const BUILTIN_FEEDS: &str = include_str!("../../config/feeds.toml");

fn default_max_age_days() -> i64 {
    7
}
fn default_max_entries_per_feed() -> usize {
    5
}
fn default_http_timeout_secs() -> u64 {
    30
}

/// Collector knobs (`[collect]` section).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectSettings {
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    #[serde(default = "default_max_entries_per_feed")]
    pub max_entries_per_feed: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            max_entries_per_feed: default_max_entries_per_feed(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedsByLanguage {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// One `[[category]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    /// Importance keywords for secondary-language entries. Empty drops them all.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub feeds: FeedsByLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTable {
    pub collect: CollectSettings,
    pub categories: Vec<CategoryConfig>,
}

#[derive(Deserialize)]
struct FeedTableFile {
    #[serde(default)]
    collect: CollectSettings,
    #[serde(rename = "category", default)]
    categories: Vec<CategoryConfig>,
}

/// Load the feed table from an explicit TOML file.
pub fn load_feed_table_from(path: &Path) -> Result<FeedTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed table from {}", path.display()))?;
    parse_feed_table(&content).with_context(|| format!("invalid feed table {}", path.display()))
}

/// Load the feed table using env var + fallbacks:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
/// 3) the table compiled into the binary
pub fn load_feed_table_default() -> Result<FeedTable> {
    if let Ok(p) = std::env::var(ENV_FEEDS_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feed_table_from(&pb);
        }
        return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
    }
    let p = PathBuf::from(DEFAULT_FEEDS_CONFIG_PATH);
    if p.exists() {
        return load_feed_table_from(&p);
    }
    parse_feed_table(BUILTIN_FEEDS).context("built-in feed table")
}

pub fn parse_feed_table(s: &str) -> Result<FeedTable> {
    let raw: FeedTableFile = toml::from_str(s)?;
    if raw.categories.is_empty() {
        bail!("feed table declares no [[category]]");
    }
    validate_collect(&raw.collect)?;

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(raw.categories.len());
    for mut c in raw.categories {
        c.name = c.name.trim().to_string();
        if c.name.is_empty() {
            bail!("category with empty name");
        }
        if !seen.insert(c.name.clone()) {
            bail!("duplicate category `{}`", c.name);
        }
        c.emoji = c.emoji.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        c.keywords = clean_keywords(c.keywords);
        c.feeds.primary = clean_urls(c.feeds.primary);
        c.feeds.secondary = clean_urls(c.feeds.secondary);
        categories.push(c);
    }

    Ok(FeedTable {
        collect: raw.collect,
        categories,
    })
}

fn validate_collect(c: &CollectSettings) -> Result<()> {
    if !(0..=MAX_AGE_DAYS_LIMIT).contains(&c.max_age_days) {
        bail!(
            "collect.max_age_days must be within 0..={MAX_AGE_DAYS_LIMIT} (got {})",
            c.max_age_days
        );
    }
    if c.max_entries_per_feed == 0 {
        bail!("collect.max_entries_per_feed must be > 0");
    }
    if c.http_timeout_secs == 0 {
        bail!("collect.http_timeout_secs must be > 0");
    }
    Ok(())
}

/// Trim, drop blanks, dedup keeping first occurrence (order drives fetch order).
fn clean_urls(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        .collect()
}

fn clean_keywords(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() {
            set.insert(t);
        }
    }
    set.into_iter().collect()
}
