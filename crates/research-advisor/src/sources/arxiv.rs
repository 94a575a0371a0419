//! arXiv export API adapter (Atom feed).
//!
//! Queries are boolean ORs of `all:` field terms joined with a literal `+OR+`,
//! which arXiv decodes to ` OR `. When the primary query comes back empty the
//! adapter retries exactly once with [`FALLBACK_TERMS`].

use async_trait::async_trait;
use quick_xml::de::DeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::{Reader, Span};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use url::Url;

use super::PaperSource;
use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::http;
use crate::models::{Paper, Source};
use crate::normalize;

/// Atom XML namespace of the arXiv feed.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Terms used for the single retry when the primary query finds nothing.
pub const FALLBACK_TERMS: [&str; 3] = ["optimization", "reinforcement learning", "machine learning"];

/// Number of search terms contributing to the primary query.
const QUERY_TERMS: usize = 3;

/// Number of words taken from each search term.
const WORDS_PER_TERM: usize = 2;

/// Boolean OR operator, left unescaped in the URL.
const OR: &str = "+OR+";

/// Atom query against `/api/query`.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Client,
    query_url: String,
}

impl ArxivSource {
    /// Create the adapter.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            client: http::build_client(config, config.arxiv_timeout, HeaderMap::new())?,
            query_url: format!("{}{}", config.arxiv_url, api::ARXIV_QUERY_PATH),
        })
    }

    /// Build the request URL for an already-encoded `search_query`.
    fn request_url(&self, search_query: &str, max_results: usize) -> ClientResult<Url> {
        let mut url = Url::parse(&self.query_url)?;
        url.set_query(Some(&format!(
            "search_query={search_query}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            max_results.min(api::ARXIV_MAX_RESULTS)
        )));
        Ok(url)
    }

    async fn run_query(&self, search_query: &str, max_results: usize) -> ClientResult<Vec<Paper>> {
        let url = self.request_url(search_query, max_results)?;
        tracing::debug!(query = %search_query, "arXiv query");

        let response = self.client.get(url).send().await?;
        let body = http::check_status(response).await?.text().await?;

        let mut papers = parse_response(&body)?;
        papers.truncate(max_results);
        Ok(papers)
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn source(&self) -> Source {
        Source::Arxiv
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

        let papers = self.run_query(&query, max_results).await?;
        if !papers.is_empty() {
            return Ok(papers);
        }

        tracing::info!("No arXiv results, retrying once with fallback terms");
        self.run_query(&fallback_query(), max_results).await
    }
}

/// Build the primary query from up to three search terms, two words each.
#[must_use]
pub fn build_query(search_terms: &[String]) -> String {
    search_terms
        .iter()
        .take(QUERY_TERMS)
        .flat_map(|term| term.split_whitespace().take(WORDS_PER_TERM))
        .map(field_term)
        .collect::<Vec<_>>()
        .join(OR)
}

/// Build the fallback query; each fallback term is kept whole.
#[must_use]
pub fn fallback_query() -> String {
    FALLBACK_TERMS.iter().map(|term| field_term(term)).collect::<Vec<_>>().join(OR)
}

fn field_term(term: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
    format!("all:{encoded}")
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: Option<String>,
}

/// Parse an Atom feed body.
///
/// The feed is walked with a streaming reader and each `<entry>` is
/// deserialized on its own, so an entry that fails to deserialize is skipped
/// without losing its siblings. Entries without a title are skipped too. A
/// feed declaring a default namespace other than Atom is rejected, as is a
/// body that is not well-formed XML.
pub fn parse_response(body: &str) -> ClientResult<Vec<Paper>> {
    let mut reader = Reader::from_str(body);
    let mut papers = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(root) => {
                check_namespace(&root)?;
                break;
            }
            Event::Empty(root) => {
                check_namespace(&root)?;
                return Ok(papers);
            }
            Event::Eof => return Err(DeError::Custom("missing feed element".to_string()).into()),
            _ => {}
        }
    }

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(element) => {
                let span = reader.read_to_end(element.name()).map_err(xml_error)?;
                if element.local_name().as_ref() != b"entry" {
                    continue;
                }
                let inner = span_text(body, span)?;
                match quick_xml::de::from_str::<AtomEntry>(&format!("<entry>{inner}</entry>")) {
                    Ok(entry) => papers.extend(entry_to_paper(entry)),
                    Err(e) => tracing::debug!(error = %e, "Skipping malformed arXiv entry"),
                }
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

fn check_namespace(root: &BytesStart<'_>) -> ClientResult<()> {
    let Some(attr) = root.try_get_attribute("xmlns").map_err(|e| xml_error(e.into()))? else {
        return Ok(());
    };
    let ns = attr.unescape_value().map_err(xml_error)?;
    if ns != ATOM_NAMESPACE {
        return Err(DeError::Custom(format!("unexpected feed namespace: {ns}")).into());
    }
    Ok(())
}

fn span_text(body: &str, span: Span) -> ClientResult<&str> {
    let start = usize::try_from(span.start).ok();
    let end = usize::try_from(span.end).ok();
    start
        .zip(end)
        .and_then(|(start, end)| body.get(start..end))
        .ok_or_else(|| DeError::Custom("entry span out of range".to_string()).into())
}

fn xml_error(e: quick_xml::Error) -> ClientError {
    DeError::from(e).into()
}

fn entry_to_paper(entry: AtomEntry) -> Option<Paper> {
    let title = normalize::clean_title(entry.title.as_deref()?)?;

    let authors = entry
        .authors
        .into_iter()
        .filter_map(|a| a.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Some(
        Paper::new(title, Source::Arxiv)
            .with_authors(authors)
            .with_abstract(entry.summary.as_deref())
            .with_published_date(entry.published.unwrap_or_default())
            .with_url(entry.id.map(|id| id.trim().to_string()).unwrap_or_default()),
    )
}
