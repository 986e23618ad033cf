//! Heuristic primary/secondary language detector.
//!
//! Counts how many marker words of each fixed list appear as whole words
//! (space-delimited) in the lowercased text. Each marker counts once. The
//! larger count wins; ties, including 0-0, are `Unknown`.

use crate::ingest::types::Language;

/// French function words.
pub const PRIMARY_MARKERS: &[&str] = &[
    "le", "la", "les", "des", "une", "est", "pour", "dans", "avec", "sur", "du", "et", "au",
    "aux", "qui", "que", "pas", "sont", "cette", "nous", "vous", "nouveau", "nouvelle",
];

/// English function words.
pub const SECONDARY_MARKERS: &[&str] = &[
    "the", "and", "is", "for", "with", "of", "to", "in", "on", "are", "this", "that", "you",
    "we", "how", "what", "new", "from", "your", "it",
];

fn count_markers(padded: &str, markers: &[&str]) -> usize {
    markers
        .iter()
        .filter(|w| padded.contains(&format!(" {w} ")))
        .count()
}

/// Classify `text` with the default marker lists.
pub fn classify(text: &str) -> Language {
    classify_with(text, PRIMARY_MARKERS, SECONDARY_MARKERS)
}

/// Same rule with explicit marker lists.
pub fn classify_with(text: &str, primary: &[&str], secondary: &[&str]) -> Language {
    if text.trim().is_empty() {
        return Language::Unknown;
    }
    let padded = format!(" {} ", text.to_lowercase());
    let p = count_markers(&padded, primary);
    let s = count_markers(&padded, secondary);
    match p.cmp(&s) {
        std::cmp::Ordering::Greater => Language::Primary,
        std::cmp::Ordering::Less => Language::Secondary,
        std::cmp::Ordering::Equal => Language::Unknown,
    }
}
