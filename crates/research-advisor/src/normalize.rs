//! Normalization rules shared by every source adapter.
//!
//! Every adapter routes titles and abstracts through these helpers so that
//! papers from different sources deduplicate and display the same way. A new
//! adapter must use them too.

use std::collections::HashSet;

use crate::models::Paper;

/// Maximum abstract length, in characters, before truncation.
pub const MAX_ABSTRACT_CHARS: usize = 500;

/// Marker appended to a truncated abstract.
pub const ELLIPSIS: &str = "...";

/// Abstract used when the source supplies none.
pub const NO_ABSTRACT: &str = "No abstract available";

/// Truncate text to [`MAX_ABSTRACT_CHARS`] characters, appending [`ELLIPSIS`]
/// only when something was cut.
#[must_use]
pub fn truncate_abstract(text: &str) -> String {
    match text.char_indices().nth(MAX_ABSTRACT_CHARS) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Trim and truncate an abstract, or return [`NO_ABSTRACT`] if it is missing
/// or blank.
#[must_use]
pub fn abstract_or_sentinel(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => truncate_abstract(t),
        _ => NO_ABSTRACT.to_string(),
    }
}

/// Trim a title, returning `None` if nothing is left.
#[must_use]
pub fn clean_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Deduplication key: lowercased and trimmed.
#[must_use]
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Drop papers whose title key was already seen; the first occurrence wins.
///
/// Papers with an empty key are dropped as well.
#[must_use]
pub fn dedup_by_title(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen = HashSet::with_capacity(papers.len());
    papers
        .into_iter()
        .filter(|paper| {
            let key = paper.title_key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}
