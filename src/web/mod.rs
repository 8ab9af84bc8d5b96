//! HTTP front end for webcat.
//!
//! Holds the per-process application context and builds the axum router
//! serving the page, the favicon and a health check.

pub mod handlers;
pub mod render;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::{info, Level};

use crate::config::{Config, QuerySpec};
use crate::error::{Result, WebcatError};
use crate::query::ResultAggregator;
use render::PageContext;

/// Read-only state shared by all requests, built once at startup.
pub struct AppContext {
    file: PathBuf,
    favicon: Option<PathBuf>,
    url_prefix: Option<String>,
    queries: Vec<QuerySpec>,
    aggregator: ResultAggregator,
}

impl AppContext {
    /// Validates the configuration and builds the context from it.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let file = config
            .file
            .clone()
            .ok_or_else(|| WebcatError::config("Missing required key 'file'"))?;

        Ok(Self {
            file,
            favicon: config.favicon.clone(),
            url_prefix: config.url_prefix().map(String::from),
            queries: config.queries.clone(),
            aggregator: ResultAggregator::from_config(config),
        })
    }

    /// Returns the favicon path, if one is configured.
    pub fn favicon(&self) -> Option<&PathBuf> {
        self.favicon.as_ref()
    }

    /// Returns the prefix routes are mounted under.
    pub fn url_prefix(&self) -> Option<&str> {
        self.url_prefix.as_deref()
    }

    /// Returns true if result bundles are streamed to the client.
    pub fn is_streaming(&self) -> bool {
        self.aggregator.is_streaming()
    }

    /// Reads the static file and aggregates the queries for one request.
    pub async fn page_context(&self) -> Result<PageContext> {
        let file_content = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|e| WebcatError::io(format!("{}: {e}", self.file.display())))?;

        let database_results = self.aggregator.aggregate(self.queries.clone()).await?;

        Ok(PageContext {
            file_content,
            url_prefix: self.url_prefix.clone().unwrap_or_default(),
            database_results,
        })
    }
}

/// Builds the router, mounted under the configured prefix.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::index))
        .route("/favicon", get(handlers::favicon))
        .route("/health", get(handlers::health))
        .with_state(ctx.clone());

    let app = match ctx.url_prefix() {
        Some(prefix) => Router::new().nest(prefix, routes),
        None => routes,
    };

    // Failures are logged with their category where they occur
    app.layer(TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)))
}

/// Serves the application until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<()> {
    let prefix = ctx.url_prefix().unwrap_or("/").to_string();
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WebcatError::io(format!("Failed to bind {addr}: {e}")))?;
    info!("webcat listening on http://{addr}{prefix}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebcatError::io(format!("Server error: {e}")))?;

    info!("webcat stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
