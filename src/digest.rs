// src/digest.rs
//! Digest rendering: records grouped by category, as plain text and HTML.
//!
//! Rendering is pure. Categories appear in first-seen order; each group shows
//! its full count but lists at most `MAX_ITEMS_PER_CATEGORY` records.

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::config::Config;
use crate::ingest::types::ArticleRecord;

pub const MAX_ITEMS_PER_CATEGORY: usize = 10;
pub const DEFAULT_CATEGORY_EMOJI: &str = "📌";

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        h1 { color: #2c3e50; }
        h2 { color: #3498db; border-bottom: 2px solid #3498db; padding-bottom: 5px; }
        .article { margin: 15px 0; padding: 10px; background: #f8f9fa; border-radius: 5px; }
        .article h3 { margin: 0 0 5px 0; color: #2c3e50; }
        .article a { color: #3498db; text-decoration: none; }
        .meta { color: #7f8c8d; font-size: 0.9em; }
        .summary { margin-top: 8px; color: #555; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; color: #7f8c8d; font-size: 0.9em; }
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Records sharing a category, in first-seen order.
pub fn group_by_category(records: &[ArticleRecord]) -> Vec<(&str, Vec<&ArticleRecord>)> {
    let mut groups: Vec<(&str, Vec<&ArticleRecord>)> = Vec::new();
    for r in records {
        match groups.iter_mut().find(|(c, _)| *c == r.category) {
            Some((_, v)) => v.push(r),
            None => groups.push((r.category.as_str(), vec![r])),
        }
    }
    groups
}

#[derive(Debug, Clone)]
pub struct DigestRenderer {
    date: NaiveDate,
    store_link: String,
    emojis: HashMap<String, String>,
}

impl DigestRenderer {
    pub fn new(date: NaiveDate, store_link: impl Into<String>) -> Self {
        Self {
            date,
            store_link: store_link.into(),
            emojis: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config, date: NaiveDate) -> Self {
        let mut r = Self::new(date, config.notion.page_link());
        for c in &config.categories {
            if let Some(e) = &c.emoji {
                r.emojis.insert(c.name.clone(), e.clone());
            }
        }
        r
    }

    pub fn with_emoji(mut self, category: &str, emoji: &str) -> Self {
        self.emojis.insert(category.to_string(), emoji.to_string());
        self
    }

    fn emoji(&self, category: &str) -> &str {
        self.emojis
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY_EMOJI)
    }

    pub fn subject(&self, added: usize) -> String {
        format!(
            "📚 Veille Tech - {added} nouveaux articles - {}",
            self.date.format("%d/%m/%Y")
        )
    }

    pub fn render(&self, records: &[ArticleRecord], added: usize) -> Digest {
        let groups = group_by_category(records);
        Digest {
            subject: self.subject(added),
            text: self.render_text(&groups, added),
            html: self.render_html(&groups, added),
        }
    }

    fn render_text(&self, groups: &[(&str, Vec<&ArticleRecord>)], added: usize) -> String {
        let mut out = format!("Veille Technologique - {added} nouveaux articles ajoutés.\n\n");
        for (category, items) in groups {
            let _ = writeln!(out, "{category}: {} articles", items.len());
        }
        let _ = write!(out, "\nConsultez votre base Notion: {}\n", self.store_link);
        out
    }

    fn render_html(&self, groups: &[(&str, Vec<&ArticleRecord>)], added: usize) -> String {
        let mut html = String::with_capacity(4096);
        let _ = write!(
            html,
            "<html>\n<head>\n    <meta charset=\"utf-8\">\n    <style>{STYLE}    </style>\n</head>\n<body>\n    \
             <h1>📚 Veille Technologique - Semaine du {}</h1>\n    \
             <p><strong>{added} nouveaux articles</strong> ajoutés à votre base Notion cette semaine !</p>\n",
            self.date.format("%d/%m/%Y")
        );

        for (category, items) in groups {
            let _ = writeln!(
                html,
                "    <h2>{} {} ({} articles)</h2>",
                self.emoji(category),
                encode_text(category),
                items.len()
            );
            for r in items.iter().take(MAX_ITEMS_PER_CATEGORY) {
                let _ = write!(
                    html,
                    "    <div class=\"article\">\n        \
                     <h3><a href=\"{}\">{}</a></h3>\n        \
                     <div class=\"meta\">Source: {}</div>\n        \
                     <div class=\"summary\">{}</div>\n    </div>\n",
                    encode_double_quoted_attribute(&r.url),
                    encode_text(&r.title),
                    encode_text(&r.source),
                    encode_text(&r.summary)
                );
            }
        }

        let _ = write!(
            html,
            "    <div class=\"footer\">\n        \
             <p>🔗 <a href=\"{}\">Voir tous les articles dans Notion</a></p>\n        \
             <p>Ce récapitulatif est envoyé automatiquement chaque lundi matin.</p>\n    \
             </div>\n</body>\n</html>\n",
            encode_double_quoted_attribute(&self.store_link)
        );
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Language;

    fn rec(category: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.into(),
            url: format!("https://x.test/{}", title.len()),
            summary: "s".into(),
            source: "Src".into(),
            category: category.into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            language: Language::Unknown,
        }
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let v = vec![rec("Cloud", "a"), rec("IA/ML", "b"), rec("Cloud", "c")];
        let g = group_by_category(&v);
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].0, "Cloud");
        assert_eq!(g[0].1.len(), 2);
        assert_eq!(g[1].0, "IA/ML");
    }

    #[test]
    fn subject_has_count_and_french_date() {
        let r = DigestRenderer::new(NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(), "link");
        assert_eq!(r.subject(3), "📚 Veille Tech - 3 nouveaux articles - 05/10/2026");
    }

    #[test]
    fn html_escapes_untrusted_text() {
        let r = DigestRenderer::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), "link");
        let mut x = rec("Cloud", "<script>alert(1)</script>");
        x.url = "https://x.test/?a=1&b=\"2\"".into();
        let d = r.render(&[x], 1);
        assert!(!d.html.contains("<script>"));
        assert!(d.html.contains("&lt;script&gt;"));
        assert!(d.html.contains("a=1&amp;b=&quot;2&quot;"));
    }
}
