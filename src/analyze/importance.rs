//! Category keyword gate for secondary-language entries.

/// True iff any keyword occurs (case-insensitive substring) in `title + summary`.
/// An empty keyword list never matches.
pub fn is_important<S: AsRef<str>>(title: &str, summary: &str, keywords: &[S]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let text = format!("{title} {summary}").to_lowercase();
    keywords.iter().any(|k| {
        let k = k.as_ref().trim().to_lowercase();
        !k.is_empty() && text.contains(k.as_str())
    })
}
