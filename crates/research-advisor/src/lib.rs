//! Research Advisor
//!
//! Finds academic papers relevant to a free-text startup idea by querying
//! Semantic Scholar, arXiv and CrossRef concurrently, normalizing their
//! records into one [`Paper`] shape and merging them into a single
//! deduplicated list.
//!
//! # Features
//!
//! - **Three sources**: JSON and Atom adapters behind one [`sources::PaperSource`] trait
//! - **Best-effort**: a failing source contributes nothing instead of failing the request
//! - **Term extraction**: offline keywords, or an LLM when a Groq key is configured
//! - **Optional store**: JSON-lines capture of returned papers
//!
//! # Example
//!
//! ```no_run
//! use research_advisor::{Aggregator, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let aggregator = Aggregator::from_config(&config)?;
//!
//!     let result = aggregator.aggregate("AI for precision farming", 15).await?;
//!     for paper in &result.papers {
//!         println!("[{}] {}", paper.source, paper.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
mod http;
pub mod models;
pub mod normalize;
pub mod server;
pub mod sources;
pub mod store;
pub mod terms;

pub use aggregator::{Aggregate, Aggregator};
pub use config::Config;
pub use error::{AppError, ClientError};
pub use models::{Paper, Source};
