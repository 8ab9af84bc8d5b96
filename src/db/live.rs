//! Live query source backed by configured database servers.
//!
//! Every query opens its own connection, which is closed again once the
//! rows have been read or the query has failed.

use super::{postgres, sqlite, DatabaseBackend, QuerySource, ResultSet};
use crate::config::{resolve_bind, QuerySpec, ServerConfig};
use crate::error::{Result, WebcatError};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Query source that runs queries against real servers.
#[derive(Debug, Clone)]
pub struct LiveQuerySource {
    servers: HashMap<String, ServerConfig>,
    streaming: bool,
}

impl LiveQuerySource {
    /// Creates a live source over the given servers.
    ///
    /// With `streaming` the connection stays open while rows are pulled;
    /// otherwise every row is fetched before the connection is released.
    pub fn new(servers: HashMap<String, ServerConfig>, streaming: bool) -> Self {
        Self { servers, streaming }
    }

    /// Returns the server a query runs against.
    fn server_for(&self, spec: &QuerySpec) -> Result<(&ServerConfig, DatabaseBackend)> {
        let server = resolve_bind(&self.servers, spec)?;
        let backend = server.backend()?;
        Ok((server, backend))
    }
}

#[async_trait]
impl QuerySource for LiveQuerySource {
    fn check(&self, spec: &QuerySpec) -> Result<()> {
        self.server_for(spec).map(|_| ())
    }

    async fn execute(&self, spec: &QuerySpec) -> Result<ResultSet> {
        let (server, backend) = self.server_for(spec)?;
        debug!(
            query = %spec.id,
            server = %server.display_string(),
            backend = backend.as_str(),
            streaming = self.streaming,
            "running live query"
        );

        match backend {
            DatabaseBackend::Postgres => postgres::execute(spec, server, self.streaming).await,
            DatabaseBackend::Sqlite => sqlite::execute(spec, server, self.streaming).await,
        }
    }
}

/// Maps a failure to open a connection to a user-friendly resource error.
pub(super) fn connect_error(spec: &QuerySpec, server: &ServerConfig, error: sqlx::Error) -> WebcatError {
    let target = server.display_string();
    let error_str = error.to_string().to_lowercase();

    let reason = if error_str.contains("connection refused") || error_str.contains("could not connect")
    {
        format!("Cannot connect to {target}. Check that the server is running.")
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        format!("Authentication failed for {target}. Check your credentials.")
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        format!("Database {target} does not exist.")
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        format!("Connection to {target} timed out.")
    } else {
        format!("Cannot open {target}: {error}")
    };

    WebcatError::resource(format!("query '{}': {reason}", spec.id))
}

/// Maps a failure to release a connection to a resource error.
pub(super) fn close_error(query_id: &str, error: sqlx::Error) -> WebcatError {
    WebcatError::resource(format!(
        "query '{query_id}': failed to close connection: {error}"
    ))
}

/// Combines a query outcome with the outcome of closing its connection.
///
/// A query failure wins over a close failure, which is only logged then.
pub(super) fn settle<T>(
    query_id: &str,
    outcome: Result<T>,
    closed: std::result::Result<(), sqlx::Error>,
) -> Result<T> {
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(close_error(query_id, e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close)) => {
            warn!(query = query_id, "failed to close connection after error: {close}");
            Err(e)
        }
    }
}
