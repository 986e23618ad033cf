// src/ingest/mod.rs
pub mod feed;
pub mod http;
pub mod types;

use chrono::{DateTime, Duration, Local};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::analyze::{classify, is_important};
use crate::config::{CategoryConfig, CollectSettings};
use crate::ingest::types::{ArticleRecord, FeedBucket, FeedEntry, FeedFetcher, Language};

pub const MAX_TITLE_CHARS: usize = 2000;
pub const MAX_SUMMARY_CHARS: usize = 300;
pub const UNTITLED: &str = "Sans titre";

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collect_entries_total", "Feed entries considered (after the per-feed cap).");
        describe_counter!("collect_kept_total", "Entries turned into records.");
        describe_counter!("collect_stale_total", "Entries older than the recency cutoff.");
        describe_counter!(
            "collect_unimportant_total",
            "Secondary-language entries dropped by the keyword gate."
        );
        describe_counter!("collect_feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("collect_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Keep at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// What happened to one feed URL during a collection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Fetched {
        source: String,
        considered: usize,
        kept: usize,
        stale: usize,
        unimportant: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub url: String,
    pub bucket: FeedBucket,
    pub outcome: FeedOutcome,
}

/// Ordered records of one category plus a report per feed.
#[derive(Debug, Clone, Default)]
pub struct CategoryCollection {
    pub records: Vec<ArticleRecord>,
    pub feeds: Vec<FeedReport>,
}

impl CategoryCollection {
    pub fn failures(&self) -> impl Iterator<Item = &FeedReport> {
        self.feeds
            .iter()
            .filter(|f| matches!(f.outcome, FeedOutcome::Failed { .. }))
    }
}

/// Build the record for an entry that passed every gate.
pub fn build_record(
    entry: &FeedEntry,
    title: &str,
    summary: &str,
    language: Language,
    source: &str,
    category: &str,
    now: DateTime<Local>,
) -> ArticleRecord {
    ArticleRecord {
        title: truncate_chars(&format!("{} {}", language.glyph(), title), MAX_TITLE_CHARS),
        url: entry.link.clone().unwrap_or_default(),
        summary: truncate_chars(summary, MAX_SUMMARY_CHARS),
        source: source.to_string(),
        category: category.to_string(),
        date: now.date_naive(),
        language,
    }
}

/// Primary-language records first, then ascending title. Stable.
pub fn sort_records(records: &mut [ArticleRecord]) {
    records.sort_by(|a, b| {
        (a.language != Language::Primary)
            .cmp(&(b.language != Language::Primary))
            .then_with(|| a.title.cmp(&b.title))
    });
}

struct FeedTally {
    kept: Vec<ArticleRecord>,
    considered: usize,
    stale: usize,
    unimportant: usize,
}

fn process_entries(
    category: &CategoryConfig,
    settings: &CollectSettings,
    bucket: FeedBucket,
    source: &str,
    entries: Vec<FeedEntry>,
    now: DateTime<Local>,
) -> FeedTally {
    // out-of-range windows mean no cutoff at all
    let cutoff = Duration::try_days(settings.max_age_days)
        .and_then(|d| now.checked_sub_signed(d))
        .map(|t| t.timestamp());
    let mut tally = FeedTally {
        kept: Vec::new(),
        considered: 0,
        stale: 0,
        unimportant: 0,
    };

    for entry in entries.into_iter().take(settings.max_entries_per_feed) {
        tally.considered += 1;

        // undated entries are never age-filtered
        if let (Some(ts), Some(cutoff)) = (entry.timestamp(), cutoff) {
            if ts < cutoff {
                tally.stale += 1;
                continue;
            }
        }

        let title = entry
            .title
            .as_deref()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let summary = entry.summary.as_deref().map(normalize_text).unwrap_or_default();

        let language = classify(&format!("{title} {summary}"));
        if bucket == FeedBucket::Secondary
            && language == Language::Secondary
            && !is_important(&title, &summary, &category.keywords)
        {
            tracing::info!(
                target: "collect",
                category = %category.name,
                %title,
                "skipped: secondary-language entry without category keyword"
            );
            tally.unimportant += 1;
            continue;
        }

        tally.kept.push(build_record(
            &entry,
            &title,
            &summary,
            language,
            source,
            &category.name,
            now,
        ));
    }
    tally
}

/// Collect one category: primary feeds in order, then secondary feeds, then sort.
pub async fn collect(
    category: &CategoryConfig,
    fetcher: &dyn FeedFetcher,
    settings: &CollectSettings,
    now: DateTime<Local>,
) -> CategoryCollection {
    ensure_metrics_described();

    let urls = category
        .feeds
        .primary
        .iter()
        .map(|u| (FeedBucket::Primary, u))
        .chain(
            category
                .feeds
                .secondary
                .iter()
                .map(|u| (FeedBucket::Secondary, u)),
        );

    let mut out = CategoryCollection::default();
    for (bucket, url) in urls {
        let doc = match fetcher.fetch(url).await.and_then(|body| feed::parse_feed(&body)) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(target: "collect", error = ?e, %url, fetcher = fetcher.name(), "feed error");
                counter!("collect_feed_errors_total").increment(1);
                out.feeds.push(FeedReport {
                    url: url.clone(),
                    bucket,
                    outcome: FeedOutcome::Failed {
                        reason: format!("{e:#}"),
                    },
                });
                continue;
            }
        };

        let source = doc
            .title
            .as_deref()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| url.clone());

        let tally = process_entries(category, settings, bucket, &source, doc.entries, now);

        counter!("collect_entries_total").increment(tally.considered as u64);
        counter!("collect_kept_total").increment(tally.kept.len() as u64);
        counter!("collect_stale_total").increment(tally.stale as u64);
        counter!("collect_unimportant_total").increment(tally.unimportant as u64);
        tracing::debug!(
            target: "collect",
            %url,
            %source,
            kept = tally.kept.len(),
            stale = tally.stale,
            unimportant = tally.unimportant,
            "feed processed"
        );

        out.feeds.push(FeedReport {
            url: url.clone(),
            bucket,
            outcome: FeedOutcome::Fetched {
                source,
                considered: tally.considered,
                kept: tally.kept.len(),
                stale: tally.stale,
                unimportant: tally.unimportant,
            },
        });
        out.records.extend(tally.kept);
    }

    sort_records(&mut out.records);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn record(title: &str, language: Language) -> ArticleRecord {
        ArticleRecord {
            title: title.into(),
            url: format!("https://x.test/{title}"),
            summary: String::new(),
            source: "X".into(),
            category: "Cloud".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            language,
        }
    }

    #[test]
    fn normalize_text_strips_markup() {
        let s = "  <p>Hello,&nbsp;&nbsp;<b>world</b></p>  \n ";
        assert_eq!(normalize_text(s), "Hello, world");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("éééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }

    #[test]
    fn primary_first_then_title() {
        let mut v = vec![
            record("b", Language::Secondary),
            record("z", Language::Primary),
            record("a", Language::Unknown),
            record("c", Language::Primary),
        ];
        sort_records(&mut v);
        let order: Vec<_> = v.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(order, vec!["c", "z", "a", "b"]);
    }

    #[test]
    fn record_title_is_prefixed_and_capped() {
        let now = Local.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).single().unwrap();
        let long = "x".repeat(3000);
        let r = build_record(
            &FeedEntry::default(),
            &long,
            &"s".repeat(400),
            Language::Unknown,
            "Feed",
            "Cloud",
            now,
        );
        assert!(r.title.starts_with("🌐 x"));
        assert_eq!(r.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(r.summary.chars().count(), MAX_SUMMARY_CHARS);
        assert_eq!(r.url, "");
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }
}
