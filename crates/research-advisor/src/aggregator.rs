//! Fan-out across paper sources and merge of their results.
//!
//! A request turns into search terms, the terms go to every source
//! concurrently with an equal share of the result budget, and the batches are
//! concatenated in source order, deduplicated by title and capped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Paper, ResearchRequest, Source};
use crate::normalize;
use crate::sources::{self, PaperSource};
use crate::store::{JsonlStore, PaperStore};
use crate::terms::{self, GroqExtractor, KeywordExtractor, TermExtractor};

/// Outcome of one aggregation.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Merged, deduplicated papers.
    pub papers: Vec<Paper>,
    /// Terms the sources were queried with.
    pub search_terms: Vec<String>,
}

/// Papers returned by one source, before merging.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// Source the papers came from.
    pub source: Source,
    /// Papers in upstream order.
    pub papers: Vec<Paper>,
}

/// Queries every source and merges the results.
pub struct Aggregator {
    sources: Vec<Arc<dyn PaperSource>>,
    extractor: Arc<dyn TermExtractor>,
    store: Option<Arc<dyn PaperStore>>,
}

impl Aggregator {
    /// Create an aggregator over `sources`, merged in the given order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn PaperSource>>, extractor: Arc<dyn TermExtractor>) -> Self {
        Self { sources, extractor, store: None }
    }

    /// Build the production aggregator from configuration.
    ///
    /// Uses the Groq extractor when a Groq key is set and a JSON-lines store
    /// when a store path is set.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let extractor: Arc<dyn TermExtractor> = match config.groq_api_key.as_deref() {
            Some(key) => Arc::new(GroqExtractor::new(config, key)?),
            None => Arc::new(KeywordExtractor),
        };

        let mut aggregator = Self::new(sources::default_sources(config)?, extractor);
        if let Some(ref path) = config.store_path {
            aggregator = aggregator.with_store(Arc::new(JsonlStore::new(path)));
        }
        Ok(aggregator)
    }

    /// Attach a paper store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PaperStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Check if a paper store is attached.
    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Sources in merge order.
    #[must_use]
    pub fn sources(&self) -> &[Arc<dyn PaperSource>] {
        &self.sources
    }

    /// Derive search terms for an idea, falling back to its longer words.
    pub async fn search_terms(&self, idea: &str) -> Vec<String> {
        let terms = self.extractor.extract(idea).await;
        if terms.is_empty() {
            tracing::debug!("Extractor returned no terms, using fallback terms");
            return terms::fallback_terms(idea);
        }
        terms
    }

    /// Handle a research request.
    ///
    /// Papers are stored in the background when the request asks for it and a
    /// store is attached; storing never affects the response.
    pub async fn handle(&self, request: &ResearchRequest) -> AppResult<Aggregate> {
        request.validate()?;

        let aggregate = self.aggregate(&request.idea, request.max_results).await?;

        if request.store {
            self.spawn_store(&aggregate.papers);
        }
        Ok(aggregate)
    }

    /// Aggregate papers for an idea.
    pub async fn aggregate(&self, idea: &str, max_results: usize) -> AppResult<Aggregate> {
        if idea.trim().is_empty() {
            return Err(AppError::validation("idea", "Idea cannot be empty"));
        }

        let search_terms = self.search_terms(idea).await;
        tracing::info!(terms = ?search_terms, max_results, "Aggregating papers");

        let papers = self.aggregate_terms(&search_terms, max_results).await;
        Ok(Aggregate { papers, search_terms })
    }

    /// Aggregate papers for already-extracted search terms.
    pub async fn aggregate_terms(&self, search_terms: &[String], max_results: usize) -> Vec<Paper> {
        let batches = self.fetch_each(search_terms, per_source_budget(max_results)).await;
        let papers = merge(batches, max_results);
        tracing::info!(count = papers.len(), "Aggregated papers");
        papers
    }

    /// Query every source concurrently with the same budget.
    ///
    /// Batches come back in source order. A source that panics contributes an
    /// empty batch.
    pub async fn fetch_each(&self, search_terms: &[String], max_results: usize) -> Vec<SourceBatch> {
        let fetches = self.sources.iter().map(|source| {
            AssertUnwindSafe(source.fetch(search_terms, max_results)).catch_unwind()
        });

        let results = join_all(fetches).await;

        self.sources
            .iter()
            .zip(results)
            .map(|(source, result)| {
                let source = source.source();
                let papers = result.unwrap_or_else(|_| {
                    tracing::error!(source = %source, "Source panicked during fetch");
                    Vec::new()
                });
                tracing::info!(source = %source, count = papers.len(), "Source returned papers");
                SourceBatch { source, papers }
            })
            .collect()
    }

    fn spawn_store(&self, papers: &[Paper]) {
        let Some(store) = self.store.clone() else {
            tracing::debug!("Store requested but no store is configured");
            return;
        };
        let papers = papers.to_vec();
        tokio::spawn(async move {
            if let Err(e) = store.store(&papers).await {
                tracing::warn!(error = %e, "Failed to store papers");
            }
        });
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("sources", &self.sources.iter().map(|s| s.source()).collect::<Vec<_>>())
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

/// Per-source result budget: an equal share of `max_results`, at least one.
#[must_use]
pub const fn per_source_budget(max_results: usize) -> usize {
    let share = max_results / Source::ALL.len();
    if share == 0 { 1 } else { share }
}

/// Concatenate batches in order, drop repeated titles and cap at `max_results`.
#[must_use]
pub fn merge(batches: Vec<SourceBatch>, max_results: usize) -> Vec<Paper> {
    let all = batches.into_iter().flat_map(|b| b.papers).collect();
    let mut papers = normalize::dedup_by_title(all);
    papers.truncate(max_results);
    papers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(source: Source, titles: &[&str]) -> SourceBatch {
        SourceBatch {
            source,
            papers: titles.iter().map(|t| Paper::new(*t, source)).collect(),
        }
    }

    #[test]
    fn test_per_source_budget() {
        assert_eq!(per_source_budget(0), 1);
        assert_eq!(per_source_budget(2), 1);
        assert_eq!(per_source_budget(3), 1);
        assert_eq!(per_source_budget(10), 3);
        assert_eq!(per_source_budget(15), 5);
    }

    #[test]
    fn test_merge_keeps_source_order_and_first_title() {
        let merged = merge(
            vec![
                batch(Source::SemanticScholar, &["A", "B"]),
                batch(Source::Arxiv, &["b", "C"]),
                batch(Source::Crossref, &["D"]),
            ],
            10,
        );
        let titles: Vec<&str> = merged.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
        assert_eq!(merged[1].source, Source::SemanticScholar);
    }

    #[test]
    fn test_merge_caps_after_dedup() {
        let merged = merge(
            vec![batch(Source::SemanticScholar, &["A", "A", "B"]), batch(Source::Arxiv, &["C"])],
            2,
        );
        let titles: Vec<&str> = merged.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
