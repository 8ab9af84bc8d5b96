//! Common test utilities.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use sqlx::{Connection, Executor, SqliteConnection};
use tower::ServiceExt;
use webcat::config::Config;
use webcat::web::{self, AppContext};

/// Writes the static file shown on the page and returns its path.
pub fn write_text_file(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("motd.txt");
    std::fs::write(&path, content).expect("Failed to write text file");
    path
}

/// Creates a SQLite database file from the given statements and returns its URL.
pub async fn seed_sqlite(dir: &Path, statements: &str) -> String {
    let path = dir.join("webcat.db");
    let mut conn = SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("Failed to create SQLite database");
    conn.execute(statements)
        .await
        .expect("Failed to seed SQLite database");
    conn.close().await.expect("Failed to close SQLite database");

    format!("sqlite://{}", path.display())
}

/// Sends a GET request through the router.
pub async fn get(config: &Config, uri: &str) -> Response<Body> {
    let ctx = AppContext::from_config(config).expect("Invalid test config");
    let app = web::router(Arc::new(ctx));

    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("Router failed")
}

/// Reads a whole response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

/// Reads a whole response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body is not UTF-8")
}

/// Asserts a successful HTML response and returns its body.
pub async fn html_ok(response: Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    body_text(response).await
}
