//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use super::Paper;
use crate::error::{AppError, AppResult};

/// Default result budget when a request omits `max_results`.
pub const DEFAULT_MAX_RESULTS: usize = 10;

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Body of `POST /research-papers`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    /// Free-text startup idea.
    pub idea: String,

    /// Maximum number of papers to return.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Persist the returned papers to the configured store.
    #[serde(default)]
    pub store: bool,
}

impl ResearchRequest {
    /// Validate the request before any network call.
    pub fn validate(&self) -> AppResult<()> {
        if self.idea.trim().is_empty() {
            return Err(AppError::validation("idea", "Idea cannot be empty"));
        }
        Ok(())
    }
}

/// Body returned by `POST /research-papers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResponse {
    /// Deduplicated papers, at most `max_results`.
    pub papers: Vec<Paper>,

    /// Search terms the sources were queried with.
    pub search_terms: Vec<String>,
}

/// Query string of `GET /debug/research-sources`.
#[derive(Debug, Clone, Deserialize)]
pub struct DebugSourcesQuery {
    /// Raw query; its first three whitespace tokens become search terms.
    #[serde(default = "default_debug_query")]
    pub query: String,

    /// Per-source result budget.
    #[serde(default = "default_debug_max_results")]
    pub max_results: usize,
}

fn default_debug_query() -> String {
    "artificial intelligence agriculture".to_string()
}

const fn default_debug_max_results() -> usize {
    5
}

impl DebugSourcesQuery {
    /// Search terms derived from the query.
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        self.query.split_whitespace().take(3).map(str::to_string).collect()
    }
}

impl Default for DebugSourcesQuery {
    fn default() -> Self {
        Self { query: default_debug_query(), max_results: default_debug_max_results() }
    }
}
