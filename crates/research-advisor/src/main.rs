//! Research Advisor - Entry Point

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use research_advisor::config::api;
use research_advisor::{Aggregator, Config, server::ResearchServer};

#[derive(Parser, Debug)]
#[command(name = "research-advisor")]
#[command(about = "Research paper aggregator over Semantic Scholar, arXiv and CrossRef")]
#[command(version)]
struct Cli {
    /// Semantic Scholar API key (optional, enables higher rate limits)
    #[arg(long, env = "SEMANTIC_SCHOLAR_API_KEY")]
    api_key: Option<String>,

    /// Groq API key (optional, enables LLM search-term extraction)
    #[arg(long, env = "GROQ_API_KEY")]
    groq_api_key: Option<String>,

    /// Append returned papers to this JSON-lines file when a request asks for it
    #[arg(long, env = "PAPER_STORE_PATH")]
    store_path: Option<PathBuf>,

    /// HTTP server port
    #[arg(long, default_value_t = api::DEFAULT_PORT, env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = Config::new(non_empty(cli.api_key))
        .with_groq_api_key(non_empty(cli.groq_api_key))
        .with_store_path(cli.store_path);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        semantic_scholar_key = config.has_api_key(),
        groq = config.has_groq_api_key(),
        store = ?config.store_path,
        "Starting research advisor"
    );

    let aggregator = Aggregator::from_config(&config)?;
    ResearchServer::new(aggregator).run_http(cli.port).await
}
