//! Property-based tests for normalization, dedup and merging.

use std::collections::HashSet;

use proptest::prelude::*;
use research_advisor::aggregator::{SourceBatch, merge, per_source_budget};
use research_advisor::models::{Paper, Source};
use research_advisor::normalize::{
    ELLIPSIS, MAX_ABSTRACT_CHARS, abstract_or_sentinel, dedup_by_title, title_key, truncate_abstract,
};

fn arb_source() -> impl Strategy<Value = Source> {
    prop_oneof![Just(Source::SemanticScholar), Just(Source::Arxiv), Just(Source::Crossref)]
}

/// Titles drawn from a small alphabet so that collisions actually happen.
fn arb_paper() -> impl Strategy<Value = Paper> {
    ("[ abAB]{0,4}", arb_source()).prop_map(|(title, source)| Paper::new(title, source))
}

fn arb_batches() -> impl Strategy<Value = Vec<SourceBatch>> {
    proptest::collection::vec(
        (arb_source(), proptest::collection::vec(arb_paper(), 0..8))
            .prop_map(|(source, papers)| SourceBatch { source, papers }),
        0..4,
    )
}

proptest! {
    /// Dedup is idempotent.
    #[test]
    fn dedup_idempotent(papers in proptest::collection::vec(arb_paper(), 0..30)) {
        let once = dedup_by_title(papers);
        let twice = dedup_by_title(once.clone());
        prop_assert_eq!(once, twice);
    }

    /// No two deduplicated papers share a title key, and none has an empty key.
    #[test]
    fn dedup_unique_keys(papers in proptest::collection::vec(arb_paper(), 0..30)) {
        let deduped = dedup_by_title(papers);
        let keys: HashSet<String> = deduped.iter().map(|p| title_key(&p.title)).collect();
        prop_assert_eq!(keys.len(), deduped.len());
        prop_assert!(!keys.contains(""));
    }

    /// Dedup keeps the first occurrence of each key, in order.
    #[test]
    fn dedup_keeps_first(papers in proptest::collection::vec(arb_paper(), 0..30)) {
        let deduped = dedup_by_title(papers.clone());
        let mut seen = HashSet::new();
        let expected: Vec<Paper> = papers
            .into_iter()
            .filter(|p| {
                let key = title_key(&p.title);
                !key.is_empty() && seen.insert(key)
            })
            .collect();
        prop_assert_eq!(deduped, expected);
    }

    /// Merged output never exceeds `max_results`.
    #[test]
    fn merge_respects_cap(batches in arb_batches(), max_results in 0usize..20) {
        let merged = merge(batches, max_results);
        prop_assert!(merged.len() <= max_results);
    }

    /// Every source gets at least one result and never more than its share.
    #[test]
    fn budget_bounds(max_results in 0usize..1000) {
        let budget = per_source_budget(max_results);
        prop_assert!(budget >= 1);
        prop_assert!(budget <= max_results.max(3) / 3);
    }

    /// Truncated abstracts are at most 500 characters plus the ellipsis.
    #[test]
    fn truncation_bound(text in "\\PC{0,800}") {
        let out = truncate_abstract(&text);
        prop_assert!(out.chars().count() <= MAX_ABSTRACT_CHARS + ELLIPSIS.len());
        if text.chars().count() <= MAX_ABSTRACT_CHARS {
            prop_assert_eq!(out, text);
        } else {
            prop_assert!(out.ends_with(ELLIPSIS));
            prop_assert!(text.starts_with(out.trim_end_matches(ELLIPSIS)));
        }
    }

    /// The abstract field is never empty.
    #[test]
    fn abstract_never_empty(text in proptest::option::of("\\s{0,3}[a-z]{0,3}")) {
        prop_assert!(!abstract_or_sentinel(text.as_deref()).is_empty());
    }
}
