//! Data sources for webcat.
//!
//! Provides a trait-based interface for running one configured query,
//! with a live implementation backed by real database servers and a
//! synthetic implementation for development.

mod delay;
mod live;
mod postgres;
mod sqlite;
pub mod synthetic;
mod types;

pub use delay::DelayPolicy;
pub use live::LiveQuerySource;
pub use synthetic::SyntheticQuerySource;
pub use types::{ResultBundle, ResultSet, Row, RowStream, Value};

use crate::config::QuerySpec;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Parses a backend from a URL scheme.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the backend as a string for log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Trait defining how one configured query becomes a result set.
#[async_trait]
pub trait QuerySource: Send + Sync {
    /// Checks a query without running it.
    ///
    /// Configuration problems found here are reported before any query runs.
    fn check(&self, spec: &QuerySpec) -> Result<()>;

    /// Runs the query and returns its field names and rows.
    async fn execute(&self, spec: &QuerySpec) -> Result<ResultSet>;
}
