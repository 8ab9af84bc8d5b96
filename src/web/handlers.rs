//! Request handlers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tracing::{debug, error, info};

use super::render::render_page;
use super::AppContext;
use crate::error::{Result, WebcatError};

/// Serves the page: the static file followed by one table per query.
///
/// Errors found before the first chunk become an error page. Errors after
/// that abort the transfer, so a truncated page never looks complete.
pub async fn index(State(ctx): State<Arc<AppContext>>) -> Result<Response> {
    info!(streaming = ctx.is_streaming(), "rendering page");
    let page = ctx.page_context().await?;

    let chunks = render_page(page).inspect_err(|e| {
        error!("{} while streaming page: {}", e.category(), e);
    });

    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(chunks),
    )
        .into_response())
}

/// Instance specific favicon from config.
pub async fn favicon(State(ctx): State<Arc<AppContext>>) -> Result<Response> {
    let Some(path) = ctx.favicon() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("favicon {} not found", path.display());
            return Ok(StatusCode::NOT_FOUND.into_response());
        }
        Err(e) => return Err(WebcatError::io(format!("{}: {e}", path.display()))),
    };

    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
