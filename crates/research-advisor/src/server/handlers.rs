//! Router and request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::{Aggregator, SourceBatch};
use crate::error::AppResult;
use crate::models::{DebugSourcesQuery, ResearchRequest, ResearchResponse, Source};

/// Browser origins allowed to call the API.
pub const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3001",
];

/// Papers listed per source in the debug summary.
const DEBUG_SAMPLE: usize = 3;

/// Create the HTTP router.
///
/// - `GET /` and `GET /health`: liveness
/// - `POST /research-papers`: aggregate papers for an idea
/// - `GET /debug/research-sources`: per-source results without merging
pub fn create_router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/research-papers", post(research_papers))
        .route("/debug/research-sources", get(debug_research_sources))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Research advisor is running",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Research Advisor API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "endpoints": {
            "research_papers": "POST /research-papers",
            "debug_sources": "GET /debug/research-sources",
            "health": "GET /health"
        }
    }))
}

async fn research_papers(
    State(aggregator): State<Arc<Aggregator>>,
    Json(request): Json<ResearchRequest>,
) -> AppResult<Json<ResearchResponse>> {
    tracing::debug!(max_results = request.max_results, store = request.store, "Research request");

    let aggregate = aggregator.handle(&request).await?;

    Ok(Json(ResearchResponse { papers: aggregate.papers, search_terms: aggregate.search_terms }))
}

#[derive(Debug, Serialize)]
struct DebugSourcesResponse {
    search_terms: Vec<String>,
    results: BTreeMap<&'static str, SourceSummary>,
}

#[derive(Debug, Serialize)]
struct PaperSummary {
    title: String,
    source: Source,
}

#[derive(Debug, Serialize)]
struct SourceSummary {
    count: usize,
    papers: Vec<PaperSummary>,
}

impl From<SourceBatch> for SourceSummary {
    fn from(batch: SourceBatch) -> Self {
        Self {
            count: batch.papers.len(),
            papers: batch
                .papers
                .into_iter()
                .take(DEBUG_SAMPLE)
                .map(|p| PaperSummary { title: p.title, source: p.source })
                .collect(),
        }
    }
}

async fn debug_research_sources(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<DebugSourcesQuery>,
) -> Json<DebugSourcesResponse> {
    let search_terms = query.search_terms();
    let batches = aggregator.fetch_each(&search_terms, query.max_results).await;

    let results = batches
        .into_iter()
        .map(|batch| (batch.source.key(), SourceSummary::from(batch)))
        .collect();

    Json(DebugSourcesResponse { search_terms, results })
}
