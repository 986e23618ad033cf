// src/notify/mod.rs
pub mod email;

use anyhow::Result;

use crate::digest::Digest;

pub use crate::notify::email::EmailNotifier;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Result of the notification stage, reported rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Failed(String),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NothingCollected,
    NothingAdded,
    NotConfigured,
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent)
    }
}
