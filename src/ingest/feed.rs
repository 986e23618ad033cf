// src/ingest/feed.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom parsing into a flat `FeedDocument`.

use anyhow::{anyhow, Context, Result};
use metrics::histogram;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::types::{FeedDocument, FeedEntry};

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    // `dc:date`; the deserializer matches on local names
    #[serde(rename = "date")]
    dc_date: Option<String>,
}

// --- RSS 1.0: items are siblings of the channel ---

#[derive(Debug, Deserialize)]
struct Rdf {
    channel: Option<RdfChannel>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RdfChannel {
    title: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|l| l.href.trim().to_string())
            .filter(|h| !h.is_empty())
    }
}

/// Parse an RFC 2822 or RFC 3339 timestamp into unix seconds.
pub fn parse_timestamp(ts: &str) -> Option<i64> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .map(|dt| dt.unix_timestamp())
        .ok()
        .or_else(|| {
            // obsolete zone names ("GMT", "EST", ...) are common in RSS
            chrono::DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.timestamp())
        })
}

/// Local name of the document's root element, if any.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

fn rss_entry(it: RssItem) -> FeedEntry {
    FeedEntry {
        title: it.title,
        link: it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        summary: it.description,
        published: it.pub_date.as_deref().and_then(parse_timestamp),
        updated: it.dc_date.as_deref().and_then(parse_timestamp),
    }
}

fn atom_entry(it: AtomEntry) -> FeedEntry {
    let link = it.alternate_link();
    FeedEntry {
        title: it.title.map(|t| t.value),
        link,
        summary: it.summary.or(it.content).map(|t| t.value),
        published: it.published.as_deref().and_then(parse_timestamp),
        updated: it.updated.as_deref().and_then(parse_timestamp),
    }
}

/// Parse a feed body. The flavour is picked from the root element.
pub fn parse_feed(body: &str) -> Result<FeedDocument> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);

    let doc = match root_element(&xml).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(&xml).context("parsing rss xml")?;
            FeedDocument {
                title: rss.channel.title,
                entries: rss.channel.items.into_iter().map(rss_entry).collect(),
            }
        }
        Some("rdf") => {
            let rdf: Rdf = from_str(&xml).context("parsing rdf xml")?;
            FeedDocument {
                title: rdf.channel.and_then(|c| c.title),
                entries: rdf.items.into_iter().map(rss_entry).collect(),
            }
        }
        Some("feed") => {
            let atom: AtomFeed = from_str(&xml).context("parsing atom xml")?;
            FeedDocument {
                title: atom.title.map(|t| t.value),
                entries: atom.entries.into_iter().map(atom_entry).collect(),
            }
        }
        Some(other) => return Err(anyhow!("unsupported feed root element <{other}>")),
        None => return Err(anyhow!("document has no root element")),
    };

    histogram!("collect_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(doc)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
