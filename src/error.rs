//! Error types for webcat.
//!
//! Defines the main error enum used throughout the application.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Main error type for webcat operations.
#[derive(Error, Debug)]
pub enum WebcatError {
    /// Configuration errors (incompatible delay keys, unresolved binds, bad config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query execution errors, tagged with the id of the failing query.
    #[error("Query error in '{query_id}': {message}")]
    Query { query_id: String, message: String },

    /// Connection acquisition or release failures.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Static file and favicon read failures.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal application errors (broken invariants, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebcatError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a query error for the query with the given id.
    pub fn query(query_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Query {
            query_id: query_id.into(),
            message: msg.into(),
        }
    }

    /// Creates a resource error with the given message.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Query { .. } => "Query Error",
            Self::Resource(_) => "Resource Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Renders the error as a standalone HTML page.
    pub fn error_page(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html><head><title>{category}</title></head>\
             <body><h1>{category}</h1><pre>{message}</pre></body></html>\n",
            category = self.category(),
            message = crate::web::render::escape_html(&self.to_string()),
        )
    }

    /// Returns the id of the query that failed, if this is a query error.
    pub fn query_id(&self) -> Option<&str> {
        match self {
            Self::Query { query_id, .. } => Some(query_id),
            _ => None,
        }
    }
}

impl IntoResponse for WebcatError {
    fn into_response(self) -> Response {
        tracing::error!("{}: {}", self.category(), self);
        (StatusCode::INTERNAL_SERVER_ERROR, Html(self.error_page())).into_response()
    }
}

/// Result type alias using WebcatError.
pub type Result<T> = std::result::Result<T, WebcatError>;
