//! HTTP front end tests, driving the router in-process.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use futures::StreamExt;
use webcat::config::{Config, QuerySpec, ServerConfig};

use super::common::{body_bytes, body_text, get, html_ok, seed_sqlite, write_text_file};

fn synthetic_config(dir: &std::path::Path, streaming: bool) -> Config {
    Config {
        file: Some(write_text_file(dir, "Welcome <home>\n")),
        streaming: Some(streaming),
        queries: vec![
            QuerySpec::synthetic("first", 2, 2),
            QuerySpec::synthetic("second", 1, 1).with_delay(0.01),
        ],
        ..Default::default()
    }
}

/// Scenario: Page in eager and streaming mode
/// Given two synthetic queries
/// When the page is requested
/// Then the escaped file content and both tables are rendered in order
#[tokio::test]
async fn test_index_renders_file_and_tables() {
    let dir = tempfile::tempdir().unwrap();

    for streaming in [false, true] {
        let html = html_ok(get(&synthetic_config(dir.path(), streaming), "/").await).await;

        assert!(html.contains("<pre class=\"file\">Welcome &lt;home&gt;\n</pre>"));
        assert!(html.contains("<th>first-field-0</th><th>first-field-1</th>"));
        assert!(html.contains("<td>first-value-1-1</td>"));

        let first = html.find("id=\"first\"").unwrap();
        let second = html.find("id=\"second\"").unwrap();
        assert!(first < second);
        assert!(html.ends_with("</html>\n"));
    }
}

/// Scenario: Page without queries
/// Given a config without queries
/// When the page is requested
/// Then only the file content is rendered
#[tokio::test]
async fn test_index_without_queries() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        file: Some(write_text_file(dir.path(), "just text")),
        ..Default::default()
    };

    let html = html_ok(get(&config, "/").await).await;
    assert!(html.contains("just text"));
    assert!(!html.contains("<section"));
}

/// Scenario: Missing static file
/// Given a config pointing at a file that does not exist
/// When the page is requested
/// Then an error page is returned
#[tokio::test]
async fn test_index_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        file: Some(dir.path().join("gone.txt")),
        ..Default::default()
    };

    let response = get(&config, "/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("I/O Error"));
}

/// Scenario: Streaming response starts before the slow rows
/// Given a slow synthetic query in streaming mode
/// When the first body frame is read
/// Then it arrives before the first delay has elapsed
#[tokio::test]
async fn test_index_streams_incrementally() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        file: Some(write_text_file(dir.path(), "early bird")),
        streaming: Some(true),
        queries: vec![QuerySpec::synthetic("slow", 3, 1).with_delay(0.3)],
        ..Default::default()
    };

    let start = Instant::now();
    let response = get(&config, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&first).contains("early bird"));
    assert!(start.elapsed() < Duration::from_millis(300));
}

/// Scenario: Live query failure in eager mode
/// Given a query failing at runtime and eager aggregation
/// When the page is requested
/// Then the whole response is an error page with no partial table
#[tokio::test]
async fn test_eager_failure_is_error_page() {
    let dir = tempfile::tempdir().unwrap();
    let url = seed_sqlite(
        dir.path(),
        "CREATE TABLE numbers (x INTEGER); INSERT INTO numbers VALUES (1), (-9223372036854775807 - 1);",
    )
    .await;

    let mut config = Config {
        file: Some(write_text_file(dir.path(), "motd")),
        streaming: Some(false),
        queries: vec![QuerySpec::live(
            "abs",
            "Abs",
            "main",
            "SELECT abs(x) AS x FROM numbers ORDER BY rowid",
        )],
        ..Default::default()
    };
    config.servers.insert("main".into(), ServerConfig::new(url));

    let response = get(&config, "/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_text(response).await;
    assert!(body.contains("Query Error"));
    assert!(!body.contains("<table>"));
}

/// Scenario: Live query failure in streaming mode
/// Given a query failing at runtime and streaming aggregation
/// When the page is read
/// Then the response started successfully but the body ends in an error
#[tokio::test]
async fn test_streaming_failure_aborts_body() {
    let dir = tempfile::tempdir().unwrap();
    let url = seed_sqlite(
        dir.path(),
        "CREATE TABLE numbers (x INTEGER); INSERT INTO numbers VALUES (1), (-9223372036854775807 - 1);",
    )
    .await;

    let mut config = Config {
        file: Some(write_text_file(dir.path(), "motd")),
        streaming: Some(true),
        queries: vec![QuerySpec::live(
            "abs",
            "Abs",
            "main",
            "SELECT abs(x) AS x FROM numbers ORDER BY rowid",
        )],
        ..Default::default()
    };
    config.servers.insert("main".into(), ServerConfig::new(url));

    let response = get(&config, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let result = axum::body::to_bytes(response.into_body(), usize::MAX).await;
    assert!(result.is_err());
}

/// Scenario: Routes under a prefix
/// Given url_prefix = "/webcat"
/// Then the page and health check live under the prefix only
#[tokio::test]
async fn test_url_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = synthetic_config(dir.path(), false);
    config.url_prefix = Some("/webcat/".into());

    assert_eq!(get(&config, "/webcat").await.status(), StatusCode::OK);
    assert_eq!(get(&config, "/webcat/health").await.status(), StatusCode::OK);
    assert_eq!(get(&config, "/health").await.status(), StatusCode::NOT_FOUND);
}

/// Scenario: Health check
#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let response = get(&synthetic_config(dir.path(), true), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

/// Scenario: Favicon
/// Given a configured favicon
/// Then it is served with an image content type, and 404 when unset
#[tokio::test]
async fn test_favicon() {
    let dir = tempfile::tempdir().unwrap();
    let icon = dir.path().join("favicon.png");
    std::fs::write(&icon, [0x89, b'P', b'N', b'G']).unwrap();

    let mut config = synthetic_config(dir.path(), false);
    assert_eq!(get(&config, "/favicon").await.status(), StatusCode::NOT_FOUND);

    config.favicon = Some(icon);
    let response = get(&config, "/favicon").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(body_bytes(response).await, vec![0x89, b'P', b'N', b'G']);
}

/// Scenario: Favicon link under a prefix
/// Given url_prefix = "/webcat" and a configured favicon
/// When the icon link on the page is followed
/// Then the favicon is served
#[tokio::test]
async fn test_favicon_link_under_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let icon = dir.path().join("favicon.ico");
    std::fs::write(&icon, [0u8, 0, 1, 0]).unwrap();

    let mut config = synthetic_config(dir.path(), false);
    config.url_prefix = Some("/webcat".into());
    config.favicon = Some(icon);

    let html = html_ok(get(&config, "/webcat").await).await;
    let start = html.find("<link rel=\"icon\" href=\"").unwrap() + "<link rel=\"icon\" href=\"".len();
    let href = &html[start..start + html[start..].find('"').unwrap()];
    assert_eq!(href, "/webcat/favicon");

    let response = get(&config, href).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/x-icon");
}
