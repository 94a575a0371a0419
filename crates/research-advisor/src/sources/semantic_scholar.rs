//! Semantic Scholar Graph API adapter.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use super::{PaperSource, joined_terms};
use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::http;
use crate::models::{Paper, Source};
use crate::normalize;

/// Paper search against `/graph/v1/paper/search`.
#[derive(Clone)]
pub struct SemanticScholarSource {
    client: Client,
    search_url: String,
    has_api_key: bool,
}

impl SemanticScholarSource {
    /// Create the adapter, attaching the API key header if one is configured.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ClientError::bad_request(format!("invalid API key header: {e}")))?;
            headers.insert("x-api-key", value);
        }

        Ok(Self {
            client: http::build_client(config, config.semantic_scholar_timeout, headers)?,
            search_url: format!(
                "{}{}",
                config.semantic_scholar_url,
                api::SEMANTIC_SCHOLAR_SEARCH_PATH
            ),
            has_api_key: config.has_api_key(),
        })
    }

    /// Check if an API key is attached to requests.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.has_api_key
    }
}

impl std::fmt::Debug for SemanticScholarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScholarSource")
            .field("search_url", &self.search_url)
            .field("has_api_key", &self.has_api_key)
            .finish()
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    async fn try_fetch(
        &self,
        search_terms: &[String],
        max_results: usize,
    ) -> ClientResult<Vec<Paper>> {
        let query = build_query(search_terms);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = max_results.min(api::SEMANTIC_SCHOLAR_MAX_LIMIT);
        let params = [
            ("query", query),
            ("limit", limit.to_string()),
            ("fields", fields::SEMANTIC_SCHOLAR.join(",")),
            ("sort", "relevance".to_string()),
        ];

        let response = self.client.get(&self.search_url).query(&params).send().await?;
        let body = http::check_status(response).await?.text().await?;

        parse_response(&body)
    }
}

/// Build the query string: the first two search terms, space-joined.
#[must_use]
pub fn build_query(search_terms: &[String]) -> String {
    joined_terms(search_terms, 2)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<SearchAuthor>>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    external_ids: Option<SearchExternalIds>,
}

#[derive(Debug, Deserialize)]
struct SearchAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchExternalIds {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

/// Parse a paper search response body.
///
/// Items that fail to deserialize or have no title are skipped.
pub fn parse_response(body: &str) -> ClientResult<Vec<Paper>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let papers = response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<SearchItem>(value) {
            Ok(item) => item_to_paper(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed Semantic Scholar item");
                None
            }
        })
        .collect();

    Ok(papers)
}

fn item_to_paper(item: SearchItem) -> Option<Paper> {
    let title = normalize::clean_title(item.title.as_deref()?)?;

    let authors = item
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Some(
        Paper::new(title, Source::SemanticScholar)
            .with_authors(authors)
            .with_abstract(item.r#abstract.as_deref())
            .with_published_date(item.year.map(|y| y.to_string()).unwrap_or_default())
            .with_url(item.url.unwrap_or_default())
            .with_doi(item.external_ids.and_then(|ids| ids.doi)),
    )
}
