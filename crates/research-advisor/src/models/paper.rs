//! Canonical paper record shared by every source adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{self, NO_ABSTRACT};

/// Provenance of a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Semantic Scholar Graph API.
    #[serde(rename = "Semantic Scholar")]
    SemanticScholar,

    /// arXiv Atom feed.
    #[serde(rename = "arXiv")]
    Arxiv,

    /// CrossRef works API.
    #[serde(rename = "CrossRef")]
    Crossref,
}

impl Source {
    /// All sources in aggregation order.
    pub const ALL: [Self; 3] = [Self::SemanticScholar, Self::Arxiv, Self::Crossref];

    /// Display label, as serialized.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SemanticScholar => "Semantic Scholar",
            Self::Arxiv => "arXiv",
            Self::Crossref => "CrossRef",
        }
    }

    /// Key used in debug output (`semantic_scholar`, `arxiv`, `crossref`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SemanticScholar => "semantic_scholar",
            Self::Arxiv => "arxiv",
            Self::Crossref => "crossref",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A research paper, normalized from any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title, never empty.
    pub title: String,

    /// Author display names in source order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Abstract, capped at 500 characters plus `...`.
    pub r#abstract: String,

    /// Publication date as the source reports it.
    #[serde(default)]
    pub published_date: String,

    /// Where the paper came from.
    pub source: Source,

    /// Link to the paper's landing page, may be empty.
    #[serde(default)]
    pub url: String,

    /// Digital Object Identifier.
    #[serde(default)]
    pub doi: Option<String>,
}

impl Paper {
    /// Create a paper with the given title and provenance.
    ///
    /// The abstract starts as the "No abstract available" sentinel; every
    /// other field starts empty.
    #[must_use]
    pub fn new(title: impl Into<String>, source: Source) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            r#abstract: NO_ABSTRACT.to_string(),
            published_date: String::new(),
            source,
            url: String::new(),
            doi: None,
        }
    }

    /// Set the authors.
    #[must_use]
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Set the abstract, applying the shared truncation and sentinel rules.
    #[must_use]
    pub fn with_abstract(mut self, text: Option<&str>) -> Self {
        self.r#abstract = normalize::abstract_or_sentinel(text);
        self
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = date.into();
        self
    }

    /// Set the landing page URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the DOI; blank values are treated as absent.
    #[must_use]
    pub fn with_doi(mut self, doi: Option<String>) -> Self {
        self.doi = doi.filter(|d| !d.trim().is_empty());
        self
    }

    /// Key used for cross-source deduplication.
    #[must_use]
    pub fn title_key(&self) -> String {
        normalize::title_key(&self.title)
    }
}
