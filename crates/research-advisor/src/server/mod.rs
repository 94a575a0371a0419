//! HTTP server for the research advisor.
//!
//! Exposes the aggregator as a small JSON API. See [`handlers::create_router`]
//! for the routes.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::aggregator::Aggregator;

pub use handlers::create_router;

/// Research advisor HTTP server.
pub struct ResearchServer {
    aggregator: Arc<Aggregator>,
}

impl ResearchServer {
    /// Create a server around an aggregator.
    #[must_use]
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator: Arc::new(aggregator) }
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.aggregator))
    }

    /// Serve HTTP on `0.0.0.0:port` until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be bound or the server fails.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        tracing::info!(
            sources = self.aggregator.sources().len(),
            store = self.aggregator.has_store(),
            "Starting HTTP server"
        );

        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Shared aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }
}

impl std::fmt::Debug for ResearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchServer").field("aggregator", &self.aggregator).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
