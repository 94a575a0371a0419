//! Search-term extraction from a free-text idea.
//!
//! [`KeywordExtractor`] works offline from a word list and a few domain
//! hints. [`GroqExtractor`] asks an LLM for academic search terms and falls
//! back to the keyword extractor on any failure.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::http;

/// Maximum number of terms an extractor returns.
pub const MAX_TERMS: usize = 5;

/// Number of terms kept by [`fallback_terms`].
const FALLBACK_TERM_COUNT: usize = 3;

const STOP_WORDS: &[&str] = &["the", "and", "for", "with", "that", "this", "your", "have", "from"];

/// Domain hints: if the idea mentions any trigger, the terms are prepended.
const DOMAINS: &[(&[&str], &[&str])] = &[
    (
        &["ai", "artificial", "machine learning", "ml"],
        &["artificial intelligence", "machine learning", "neural networks"],
    ),
    (
        &["agriculture", "farming", "crop", "soil"],
        &["agriculture", "precision farming", "crop yield"],
    ),
    (
        &["health", "medical", "patient", "diagnosis"],
        &["healthcare", "medical technology", "clinical"],
    ),
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word regex pattern"));

static LONG_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w{4,}").expect("valid long-word regex pattern"));

/// Derives search terms from an idea.
#[async_trait]
pub trait TermExtractor: Send + Sync {
    /// Extract up to [`MAX_TERMS`] search terms. May return an empty list.
    async fn extract(&self, idea: &str) -> Vec<String>;
}

/// Offline extractor: domain hints followed by the idea's own words.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Extract terms synchronously.
    #[must_use]
    pub fn extract_terms(idea: &str) -> Vec<String> {
        let lower = idea.to_lowercase();
        let words: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();
        let word_set: HashSet<&str> = words.iter().copied().collect();

        let mentions = |trigger: &str| {
            if trigger.contains(' ') {
                lower.contains(trigger)
            } else {
                word_set.contains(trigger)
            }
        };

        let domain_terms = DOMAINS
            .iter()
            .filter(|(triggers, _)| triggers.iter().any(|t| mentions(t)))
            .flat_map(|(_, terms)| terms.iter().copied());

        let idea_words = words
            .iter()
            .copied()
            .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(w));

        let mut seen = HashSet::new();
        domain_terms
            .chain(idea_words)
            .filter(|t| seen.insert(*t))
            .take(MAX_TERMS)
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl TermExtractor for KeywordExtractor {
    async fn extract(&self, idea: &str) -> Vec<String> {
        Self::extract_terms(idea)
    }
}

/// Last-resort terms: the first three runs of four or more word characters.
#[must_use]
pub fn fallback_terms(idea: &str) -> Vec<String> {
    LONG_WORD_RE
        .find_iter(idea)
        .take(FALLBACK_TERM_COUNT)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// LLM-backed extractor using the Groq chat completions API.
#[derive(Clone)]
pub struct GroqExtractor {
    client: Client,
    url: String,
}

impl GroqExtractor {
    /// Create the extractor with a bearer API key.
    pub fn new(config: &Config, api_key: &str) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ClientError::bad_request(format!("invalid Groq API key header: {e}")))?;
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        Ok(Self {
            client: http::build_client(config, config.groq_timeout, headers)?,
            url: format!("{}{}", config.groq_url, api::GROQ_CHAT_PATH),
        })
    }

    async fn request_terms(&self, idea: &str) -> ClientResult<Vec<String>> {
        let prompt = format!(
            "Extract 3-5 precise technical and academic search terms from this startup idea: {idea}\n\
             Focus on terms that would be effective for searching academic databases like \
             Semantic Scholar, arXiv, and CrossRef.\n\
             Return ONLY the terms separated by commas, no explanations or extra text."
        );

        let payload = serde_json::json!({
            "model": api::GROQ_MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert research assistant. Extract precise academic \
                                search terms that would return highly relevant research papers."
                },
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.1,
            "max_tokens": 50
        });

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(Deserialize)]
        struct Message {
            #[serde(default)]
            content: String,
        }

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let body = http::check_status(response).await?.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        Ok(chat.choices.first().map(|c| clean_llm_terms(&c.message.content)).unwrap_or_default())
    }
}

impl std::fmt::Debug for GroqExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqExtractor").field("url", &self.url).finish()
    }
}

#[async_trait]
impl TermExtractor for GroqExtractor {
    async fn extract(&self, idea: &str) -> Vec<String> {
        match self.request_terms(idea).await {
            Ok(terms) if !terms.is_empty() => terms,
            Ok(_) => {
                tracing::info!("Groq returned no usable terms, using keyword extraction");
                KeywordExtractor::extract_terms(idea)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Groq term extraction failed, using keyword extraction");
                KeywordExtractor::extract_terms(idea)
            }
        }
    }
}

/// Split and filter a comma-separated LLM answer.
#[must_use]
pub fn clean_llm_terms(content: &str) -> Vec<String> {
    content
        .trim()
        .split(',')
        .map(|t| t.trim().trim_matches('"').trim_matches('\'').trim())
        .filter(|t| {
            t.chars().count() > 2
                && !t.chars().all(|c| c.is_ascii_digit())
                && !t.starts_with("Here")
                && !["the", "and", "for"].contains(&t.to_lowercase().as_str())
        })
        .take(MAX_TERMS)
        .map(str::to_string)
        .collect()
}
