//! CrossRef works API adapter.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::{PaperSource, joined_terms};
use crate::config::{Config, api, fields};
use crate::error::ClientResult;
use crate::http;
use crate::models::{Paper, Source};
use crate::normalize;

/// Works search against `/works`.
#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: Client,
    works_url: String,
}

impl CrossrefSource {
    /// Create the adapter.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            client: http::build_client(config, config.crossref_timeout, HeaderMap::new())?,
            works_url: format!("{}{}", config.crossref_url, api::CROSSREF_WORKS_PATH),
        })
    }
}

#[async_trait]
impl PaperSource for CrossrefSource {
    fn source(&self) -> Source {
        Source::Crossref
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

        let rows = max_results.min(api::CROSSREF_MAX_ROWS);
        let params = [
            ("query", query),
            ("rows", rows.to_string()),
            ("sort", "relevance".to_string()),
            ("select", fields::CROSSREF.join(",")),
        ];

        let response = self.client.get(&self.works_url).query(&params).send().await?;
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
struct WorksResponse {
    #[serde(default)]
    message: Option<WorksMessage>,
}

#[derive(Debug, Deserialize)]
struct WorksMessage {
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    title: Option<Title>,
    #[serde(default)]
    author: Option<Vec<WorkAuthor>>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(rename = "published-print", default)]
    published_print: Option<DateField>,
    #[serde(rename = "published-online", default)]
    published_online: Option<DateField>,
    #[serde(default)]
    created: Option<DateField>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

/// CrossRef titles are usually a list of fragments, occasionally a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Title {
    Fragments(Vec<String>),
    Single(String),
}

impl Title {
    fn joined(self) -> String {
        match self {
            Self::Fragments(parts) => parts.join(" "),
            Self::Single(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    family: Option<String>,
}

impl WorkAuthor {
    fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.given.as_deref().unwrap_or_default(),
            self.family.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct DateField {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}

impl DateField {
    /// Join up to three date parts with `-`, or `None` if there are none.
    fn formatted(&self) -> Option<String> {
        let parts: Vec<String> = self
            .date_parts
            .first()?
            .iter()
            .take(3)
            .map_while(|p| p.map(|n| n.to_string()))
            .collect();
        (!parts.is_empty()).then(|| parts.join("-"))
    }
}

/// Parse a works search response body.
///
/// Items that fail to deserialize or have no title are skipped.
pub fn parse_response(body: &str) -> ClientResult<Vec<Paper>> {
    let response: WorksResponse = serde_json::from_str(body)?;

    let papers = response
        .message
        .and_then(|m| m.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Work>(value) {
            Ok(work) => work_to_paper(work),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed CrossRef item");
                None
            }
        })
        .collect();

    Ok(papers)
}

fn work_to_paper(work: Work) -> Option<Paper> {
    let title = normalize::clean_title(&work.title?.joined())?;

    let authors = work
        .author
        .unwrap_or_default()
        .iter()
        .filter_map(WorkAuthor::display_name)
        .collect();

    let published_date = [&work.published_print, &work.published_online, &work.created]
        .into_iter()
        .flatten()
        .find_map(DateField::formatted)
        .unwrap_or_default();

    Some(
        Paper::new(title, Source::Crossref)
            .with_authors(authors)
            .with_abstract(work.r#abstract.as_deref())
            .with_published_date(published_date)
            .with_url(work.url.unwrap_or_default())
            .with_doi(work.doi),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::NO_ABSTRACT;

    fn works(items: serde_json::Value) -> String {
        json!({
            "status": "ok",
            "message-type": "work-list",
            "message": {"total-results": 1, "items": items}
        })
        .to_string()
    }

    #[test]
    fn test_parse_full_item() {
        let body = works(json!([{
            "title": ["Smart Irrigation", "for Arid Regions"],
            "author": [
                {"given": "Grace", "family": "Hopper", "sequence": "first"},
                {"family": "Turing"},
                {"name": "Some Consortium"}
            ],
            "abstract": "<jats:p>Water matters.</jats:p>",
            "published-print": {"date-parts": [[2020, 5, 17]]},
            "created": {"date-parts": [[2019, 1, 1]]},
            "URL": "http://dx.doi.org/10.1000/abc",
            "DOI": "10.1000/abc"
        }]));

        let papers = parse_response(&body).unwrap();
        assert_eq!(papers.len(), 1);
        let p = &papers[0];
        assert_eq!(p.title, "Smart Irrigation for Arid Regions");
        assert_eq!(p.authors, vec!["Grace Hopper", "Turing"]);
        assert_eq!(p.r#abstract, "<jats:p>Water matters.</jats:p>");
        assert_eq!(p.published_date, "2020-5-17");
        assert_eq!(p.url, "http://dx.doi.org/10.1000/abc");
        assert_eq!(p.doi.as_deref(), Some("10.1000/abc"));
        assert_eq!(p.source, Source::Crossref);
    }

    #[test]
    fn test_date_resolution_order() {
        let body = works(json!([
            {
                "title": ["Online only"],
                "published-print": {"date-parts": [[]]},
                "published-online": {"date-parts": [[2022, 3]]},
                "created": {"date-parts": [[2021, 1, 1]]}
            },
            {
                "title": ["Created only"],
                "created": {"date-parts": [[2018, 12, 30, 99]]}
            },
            {
                "title": ["Undated"],
                "published-print": {"date-parts": [[null]]}
            }
        ]));

        let papers = parse_response(&body).unwrap();
        assert_eq!(papers[0].published_date, "2022-3");
        assert_eq!(papers[1].published_date, "2018-12-30");
        assert_eq!(papers[2].published_date, "");
    }

    #[test]
    fn test_title_as_string() {
        let body = works(json!([{"title": "  Plain title  "}]));
        let papers = parse_response(&body).unwrap();
        assert_eq!(papers[0].title, "Plain title");
        assert_eq!(papers[0].r#abstract, NO_ABSTRACT);
    }

    #[test]
    fn test_parse_skips_untitled_and_malformed() {
        let body = works(json!([
            {"title": []},
            {"title": [" ", ""]},
            {"title": 7},
            {"DOI": "10.1/none"},
            {"title": ["Kept"], "abstract": ""}
        ]));

        let papers = parse_response(&body).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Kept");
        assert_eq!(papers[0].r#abstract, NO_ABSTRACT);
    }

    #[test]
    fn test_parse_missing_message() {
        assert!(parse_response(r#"{"status": "ok"}"#).unwrap().is_empty());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn test_build_query() {
        let terms: Vec<String> =
            ["smart irrigation", "arid", "water"].iter().map(|t| t.to_string()).collect();
        assert_eq!(build_query(&terms), "smart irrigation arid");
    }
}
