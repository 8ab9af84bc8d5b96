//! Streaming HTML rendering of the page.
//!
//! Uses embedded templates with simple string interpolation. Output is
//! produced chunk by chunk: the page head with the file content first,
//! then one chunk per table head, per row and per table foot.

use futures::{Stream, TryStreamExt};

use crate::db::{ResultBundle, Row};
use crate::error::Result;
use crate::query::BundleStream;

/// Everything the page template needs.
pub struct PageContext {
    /// Static file content, shown verbatim.
    pub file_content: String,
    /// Prefix the routes are mounted under, empty at the root.
    pub url_prefix: String,
    /// Ordered result bundles, possibly still being computed.
    pub database_results: BundleStream,
}

const PAGE_FOOT: &str = "</main>\n</body>\n</html>\n";
const TABLE_FOOT: &str = "</tbody>\n</table>\n</section>\n";

const STYLE: &str = r#"
        body { font-family: sans-serif; margin: 2rem; }
        pre.file { background: #f4f4f4; padding: 1rem; }
        table { border-collapse: collapse; margin-bottom: 2rem; }
        th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; text-align: left; }
        td.null { color: #999; }
"#;

/// Renders the page as a sequence of HTML chunks.
///
/// A failing bundle or row ends the sequence with that error after
/// whatever was already produced.
pub fn render_page(page: PageContext) -> impl Stream<Item = Result<String>> + Send + 'static {
    async_stream::try_stream! {
        let PageContext { file_content, url_prefix, mut database_results } = page;
        yield page_head(&file_content, &url_prefix);

        while let Some(bundle) = database_results.try_next().await? {
            let ResultBundle { id, title, result } = bundle;
            let (field_names, mut rows) = result.into_parts();
            yield table_head(&id, &title, &field_names);

            while let Some(row) = rows.try_next().await? {
                yield table_row(&row);
            }
            yield TABLE_FOOT.to_string();
        }

        yield PAGE_FOOT.to_string();
    }
}

fn page_head(file_content: &str, url_prefix: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>webcat</title>
    <link rel="icon" href="{}/favicon">
    <style>{STYLE}</style>
</head>
<body>
<main>
<pre class="file">{}</pre>
"#,
        escape_html(url_prefix),
        escape_html(file_content)
    )
}

fn table_head(id: &str, title: &str, field_names: &[String]) -> String {
    let header: String = field_names
        .iter()
        .map(|name| format!("<th>{}</th>", escape_html(name)))
        .collect();

    format!(
        "<section id=\"{}\">\n<h2>{}</h2>\n<table>\n<thead><tr>{header}</tr></thead>\n<tbody>\n",
        escape_html(id),
        escape_html(title),
    )
}

fn table_row(row: &Row) -> String {
    let cells: String = row
        .iter()
        .map(|value| {
            if value.is_null() {
                "<td class=\"null\">NULL</td>".to_string()
            } else {
                format!("<td>{}</td>", escape_html(&value.to_display_string()))
            }
        })
        .collect();

    format!("<tr>{cells}</tr>\n")
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
