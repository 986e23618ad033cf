// src/analyze/mod.rs
//! Text heuristics applied to feed entries before they become records.

pub mod importance;
pub mod language;

pub use crate::analyze::importance::is_important;
pub use crate::analyze::language::classify;
