//! Data models: the canonical `Paper` record and HTTP bodies.
//!
//! Field names serialize in snake_case, matching what the web client reads.

mod inputs;
mod paper;

pub use inputs::{DEFAULT_MAX_RESULTS, DebugSourcesQuery, ResearchRequest, ResearchResponse};
pub use paper::{Paper, Source};
