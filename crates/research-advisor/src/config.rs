//! Configuration for the research advisor.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Semantic Scholar API.
    pub const SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org";

    /// Paper search path under the Semantic Scholar base URL.
    pub const SEMANTIC_SCHOLAR_SEARCH_PATH: &str = "/graph/v1/paper/search";

    /// Base URL for the arXiv export API.
    pub const ARXIV_URL: &str = "https://export.arxiv.org";

    /// Atom query path under the arXiv base URL.
    pub const ARXIV_QUERY_PATH: &str = "/api/query";

    /// Base URL for the CrossRef REST API.
    pub const CROSSREF_URL: &str = "https://api.crossref.org";

    /// Works path under the CrossRef base URL.
    pub const CROSSREF_WORKS_PATH: &str = "/works";

    /// Base URL for the Groq API (search-term extraction).
    pub const GROQ_URL: &str = "https://api.groq.com";

    /// Chat completions path under the Groq base URL.
    pub const GROQ_CHAT_PATH: &str = "/openai/v1/chat/completions";

    /// Model used for search-term extraction.
    pub const GROQ_MODEL: &str = "llama3-8b-8192";

    /// User agent sent to every upstream API.
    pub const USER_AGENT: &str = "Research-Advisor-API/1.0 (mailto:contact@researchadvisor.com)";

    /// Semantic Scholar request timeout.
    pub const SEMANTIC_SCHOLAR_TIMEOUT: Duration = Duration::from_secs(30);

    /// arXiv request timeout (Atom feeds are slow to render).
    pub const ARXIV_TIMEOUT: Duration = Duration::from_secs(45);

    /// CrossRef request timeout.
    pub const CROSSREF_TIMEOUT: Duration = Duration::from_secs(45);

    /// Groq request timeout.
    pub const GROQ_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection timeout shared by all clients.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Upper bound on `limit` sent to Semantic Scholar.
    pub const SEMANTIC_SCHOLAR_MAX_LIMIT: usize = 10;

    /// Upper bound on `max_results` sent to arXiv.
    pub const ARXIV_MAX_RESULTS: usize = 20;

    /// Upper bound on `rows` sent to CrossRef.
    pub const CROSSREF_MAX_ROWS: usize = 20;

    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 8000;
}

/// Field selections for upstream requests.
pub mod fields {
    /// Semantic Scholar paper fields.
    pub const SEMANTIC_SCHOLAR: &[&str] =
        &["title", "authors", "abstract", "year", "url", "externalIds", "citationCount"];

    /// CrossRef `select` fields.
    pub const CROSSREF: &[&str] = &[
        "title",
        "author",
        "abstract",
        "created",
        "URL",
        "DOI",
        "published-print",
        "published-online",
    ];
}

/// Service configuration, injected into every source adapter.
#[derive(Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional).
    pub api_key: Option<String>,

    /// Groq API key (optional, enables LLM search-term extraction).
    pub groq_api_key: Option<String>,

    /// Semantic Scholar base URL (for testing with mock servers).
    pub semantic_scholar_url: String,

    /// arXiv base URL.
    pub arxiv_url: String,

    /// CrossRef base URL.
    pub crossref_url: String,

    /// Groq base URL.
    pub groq_url: String,

    /// User agent for outbound requests.
    pub user_agent: String,

    /// Semantic Scholar request timeout.
    pub semantic_scholar_timeout: Duration,

    /// arXiv request timeout.
    pub arxiv_timeout: Duration,

    /// CrossRef request timeout.
    pub crossref_timeout: Duration,

    /// Groq request timeout.
    pub groq_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Where returned papers are appended when storing is requested.
    pub store_path: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration with optional Semantic Scholar API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            groq_api_key: None,
            semantic_scholar_url: api::SEMANTIC_SCHOLAR_URL.to_string(),
            arxiv_url: api::ARXIV_URL.to_string(),
            crossref_url: api::CROSSREF_URL.to_string(),
            groq_url: api::GROQ_URL.to_string(),
            user_agent: api::USER_AGENT.to_string(),
            semantic_scholar_timeout: api::SEMANTIC_SCHOLAR_TIMEOUT,
            arxiv_timeout: api::ARXIV_TIMEOUT,
            crossref_timeout: api::CROSSREF_TIMEOUT,
            groq_timeout: api::GROQ_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            store_path: None,
        }
    }

    /// Create a test configuration pointing every upstream at one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            api_key: None,
            groq_api_key: None,
            semantic_scholar_url: base_url.to_string(),
            arxiv_url: base_url.to_string(),
            crossref_url: base_url.to_string(),
            groq_url: base_url.to_string(),
            user_agent: api::USER_AGENT.to_string(),
            semantic_scholar_timeout: Duration::from_secs(5),
            arxiv_timeout: Duration::from_secs(5),
            crossref_timeout: Duration::from_secs(5),
            groq_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            store_path: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Loads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new(non_empty_var("SEMANTIC_SCHOLAR_API_KEY"));
        config.groq_api_key = non_empty_var("GROQ_API_KEY");
        config.store_path = non_empty_var("PAPER_STORE_PATH").map(PathBuf::from);
        Ok(config)
    }

    /// Set the Groq API key.
    #[must_use]
    pub fn with_groq_api_key(mut self, key: Option<String>) -> Self {
        self.groq_api_key = key;
        self
    }

    /// Set the paper store path.
    #[must_use]
    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        self.store_path = path;
        self
    }

    /// Check if a Semantic Scholar API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if a Groq API key is configured.
    #[must_use]
    pub const fn has_groq_api_key(&self) -> bool {
        self.groq_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("has_groq_api_key", &self.has_groq_api_key())
            .field("semantic_scholar_url", &self.semantic_scholar_url)
            .field("arxiv_url", &self.arxiv_url)
            .field("crossref_url", &self.crossref_url)
            .field("store_path", &self.store_path)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
