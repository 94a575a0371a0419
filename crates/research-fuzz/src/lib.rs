//! Fuzzing library for research-advisor.
//!
//! Targets feed arbitrary bytes to the upstream response parsers and the
//! request body, which must return `Err` rather than panic.
//!
//! # Usage
//!
//! ```bash
//! cd crates/research-fuzz
//! cargo +nightly fuzz run fuzz_arxiv_feed -- -max_total_time=60
//! ```

pub use research_advisor::{models, sources};
