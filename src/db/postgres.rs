//! PostgreSQL execution for the live query source, using sqlx.

use super::live::{close_error, connect_error, settle};
use super::{ResultSet, Row, Value};
use crate::config::{QuerySpec, ServerConfig};
use crate::error::{Result, WebcatError};
use futures::{Stream, TryStreamExt};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column as _, Connection, Executor, Row as _, Statement as _, TypeInfo};

/// Opens a connection, runs the query and returns its result set.
pub(super) async fn execute(
    spec: &QuerySpec,
    server: &ServerConfig,
    streaming: bool,
) -> Result<ResultSet> {
    let mut conn = PgConnection::connect(&server.url)
        .await
        .map_err(|e| connect_error(spec, server, e))?;

    let field_names = match describe(&mut conn, &spec.query).await {
        Ok(names) => names,
        Err(e) => {
            let outcome = Err(WebcatError::query(&spec.id, format_query_error(e)));
            return settle(&spec.id, outcome, conn.close().await);
        }
    };

    if streaming {
        let rows = stream_rows(spec.id.clone(), spec.query.clone(), conn);
        return Ok(ResultSet::new(field_names, rows));
    }

    let fetched = sqlx::query(&spec.query)
        .fetch_all(&mut conn)
        .await
        .map(|rows| rows.iter().map(convert_row).collect::<Vec<Row>>())
        .map_err(|e| WebcatError::query(&spec.id, format_query_error(e)));
    let rows = settle(&spec.id, fetched, conn.close().await)?;

    Ok(ResultSet::materialized(field_names, rows))
}

/// Prepares the query to learn its field names, even for empty results.
async fn describe(conn: &mut PgConnection, sql: &str) -> std::result::Result<Vec<String>, sqlx::Error> {
    let statement = (&mut *conn).prepare(sql).await?;
    Ok(statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect())
}

/// Streams rows while holding the connection, closing it after the last row.
fn stream_rows(
    query_id: String,
    sql: String,
    conn: PgConnection,
) -> impl Stream<Item = Result<Row>> + Send + 'static {
    async_stream::try_stream! {
        let mut conn = conn;
        {
            let mut fetched = sqlx::query(&sql).fetch(&mut conn);
            while let Some(row) = fetched
                .try_next()
                .await
                .map_err(|e| WebcatError::query(&query_id, format_query_error(e)))?
            {
                yield convert_row(&row);
            }
        }
        conn.close().await.map_err(|e| close_error(&query_id, e))?;
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    let value = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row.try_get::<Option<bool>, _>(index).map(Value::from),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .map(|v| Value::from(v.map(i64::from))),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .map(|v| Value::from(v.map(i64::from))),

        "INT8" | "BIGINT" => row.try_get::<Option<i64>, _>(index).map(Value::from),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| Value::from(v.map(f64::from))),

        "FLOAT8" | "DOUBLE PRECISION" => row.try_get::<Option<f64>, _>(index).map(Value::from),

        "BYTEA" => row.try_get::<Option<Vec<u8>>, _>(index).map(Value::from),

        // Everything else is shown as text when it decodes as text
        _ => row.try_get::<Option<String>, _>(index).map(Value::from),
    };

    value.unwrap_or(Value::Null)
}

/// Formats a query error with the details PostgreSQL provides.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
