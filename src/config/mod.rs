// src/config/mod.rs
//! Run configuration, built once at startup and passed down explicitly.

pub mod credentials;
pub mod feeds;

pub use crate::config::credentials::{EmailSettings, NotionSettings};
pub use crate::config::feeds::{CategoryConfig, CollectSettings, FeedTable, FeedsByLanguage};

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub collect: CollectSettings,
    pub categories: Vec<CategoryConfig>,
    pub notion: NotionSettings,
    /// `None` when the mail credentials are incomplete.
    pub email: Option<EmailSettings>,
}

impl Config {
    /// Feed table from disk (or the built-in one) plus credentials from the environment.
    pub fn load() -> Result<Self> {
        let table = feeds::load_feed_table_default()?;
        let email = match EmailSettings::from_env() {
            Ok(e) => Some(e),
            Err(missing) => {
                tracing::warn!(?missing, "email settings incomplete");
                None
            }
        };
        Ok(Self::from_parts(table, NotionSettings::from_env(), email))
    }

    pub fn from_parts(
        table: FeedTable,
        notion: NotionSettings,
        email: Option<EmailSettings>,
    ) -> Self {
        Self {
            collect: table.collect,
            categories: table.categories,
            notion,
            email,
        }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }
}
