// src/lib.rs
//! Weekly tech-watch: collect feeds by topic, store new articles in Notion,
//! email a digest of what was found.

pub mod analyze;
pub mod config;
pub mod digest;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod store;

/// `EnvFilter` directives used when `RUST_LOG` is unset.
/// Stage logs use their own targets, so each one is listed.
pub const DEFAULT_LOG_FILTER: &str =
    "tech_watch=info,collect=info,store=info,notify=info,pipeline=info,warn";

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::ingest::types::{ArticleRecord, Language};
pub use crate::pipeline::{Pipeline, RunReport};
