//! Paper source adapters.
//!
//! One adapter per upstream API. Each adapter owns its query dialect, its HTTP
//! client and a pure `parse_response` function for its wire format:
//!
//! - [`SemanticScholarSource`]: Graph API paper search (JSON)
//! - [`ArxivSource`]: export API query (Atom XML), with a one-shot fallback query
//! - [`CrossrefSource`]: works search (JSON)
//!
//! Adapters never fail past [`PaperSource::fetch`]: transport, status and parse
//! errors are logged and turn into an empty list.

pub mod arxiv;
pub mod crossref;
pub mod semantic_scholar;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{Paper, Source};

pub use arxiv::ArxivSource;
pub use crossref::CrossrefSource;
pub use semantic_scholar::SemanticScholarSource;

/// A searchable paper source.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Provenance tag stamped on every paper this adapter returns.
    fn source(&self) -> Source;

    /// Query the upstream API, returning `Err` on transport, status or
    /// document-level parse failure.
    async fn try_fetch(
        &self,
        search_terms: &[String],
        max_results: usize,
    ) -> ClientResult<Vec<Paper>>;

    /// Query the upstream API, returning at most `max_results` papers.
    ///
    /// Any failure is logged and yields an empty list.
    async fn fetch(&self, search_terms: &[String], max_results: usize) -> Vec<Paper> {
        match self.try_fetch(search_terms, max_results).await {
            Ok(mut papers) => {
                papers.truncate(max_results);
                tracing::debug!(source = %self.source(), count = papers.len(), "Fetched papers");
                papers
            }
            Err(e) => {
                log_failure(self.source(), &e);
                Vec::new()
            }
        }
    }
}

fn log_failure(source: Source, error: &ClientError) {
    if error.is_retryable() {
        tracing::warn!(source = %source, status = ?error.status(), error = %error, "Source unavailable");
    } else {
        tracing::error!(source = %source, status = ?error.status(), error = %error, "Source fetch failed");
    }
}

/// Build the three production adapters in aggregation order.
pub fn default_sources(config: &Config) -> ClientResult<Vec<Arc<dyn PaperSource>>> {
    Ok(vec![
        Arc::new(SemanticScholarSource::new(config)?),
        Arc::new(ArxivSource::new(config)?),
        Arc::new(CrossrefSource::new(config)?),
    ])
}

/// Space-join the first `n` search terms into a single query string.
fn joined_terms(search_terms: &[String], n: usize) -> String {
    search_terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl PaperSource for Failing {
        fn source(&self) -> Source {
            Source::Crossref
        }

        async fn try_fetch(&self, _: &[String], _: usize) -> ClientResult<Vec<Paper>> {
            Err(ClientError::server(503, "unavailable"))
        }
    }

    struct Generous;

    #[async_trait]
    impl PaperSource for Generous {
        fn source(&self) -> Source {
            Source::Arxiv
        }

        async fn try_fetch(&self, _: &[String], _: usize) -> ClientResult<Vec<Paper>> {
            Ok((0..10).map(|i| Paper::new(format!("Paper {i}"), Source::Arxiv)).collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_error_to_empty() {
        let papers = Failing.fetch(&["x".to_string()], 5).await;
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_caps_results() {
        let papers = Generous.fetch(&["x".to_string()], 3).await;
        assert_eq!(papers.len(), 3);
        assert_eq!(papers[0].title, "Paper 0");
    }

    #[test]
    fn test_joined_terms() {
        let terms: Vec<String> =
            ["machine learning", " ", "crops", "soil"].iter().map(|t| t.to_string()).collect();
        assert_eq!(joined_terms(&terms, 2), "machine learning crops");
        assert_eq!(joined_terms(&[], 2), "");
    }

    #[test]
    fn test_default_sources_order() {
        let sources = default_sources(&Config::default()).unwrap();
        let order: Vec<Source> = sources.iter().map(|s| s.source()).collect();
        assert_eq!(order, Source::ALL.to_vec());
    }
}
