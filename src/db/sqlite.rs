//! SQLite execution for the live query source, using sqlx.

use super::live::{close_error, connect_error, settle};
use super::{ResultSet, Row, Value};
use crate::config::{QuerySpec, ServerConfig};
use crate::error::{Result, WebcatError};
use futures::{Stream, TryStreamExt};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column as _, Connection, Executor, Row as _, Statement as _, TypeInfo, ValueRef};

/// Opens a connection, runs the query and returns its result set.
pub(super) async fn execute(
    spec: &QuerySpec,
    server: &ServerConfig,
    streaming: bool,
) -> Result<ResultSet> {
    let mut conn = SqliteConnection::connect(&server.url)
        .await
        .map_err(|e| connect_error(spec, server, e))?;

    let field_names = match describe(&mut conn, &spec.query).await {
        Ok(names) => names,
        Err(e) => {
            let outcome = Err(WebcatError::query(&spec.id, e.to_string()));
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
        .map_err(|e| WebcatError::query(&spec.id, e.to_string()));
    let rows = settle(&spec.id, fetched, conn.close().await)?;

    Ok(ResultSet::materialized(field_names, rows))
}

async fn describe(
    conn: &mut SqliteConnection,
    sql: &str,
) -> std::result::Result<Vec<String>, sqlx::Error> {
    let statement = (&mut *conn).prepare(sql).await?;
    Ok(statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect())
}

fn stream_rows(
    query_id: String,
    sql: String,
    conn: SqliteConnection,
) -> impl Stream<Item = Result<Row>> + Send + 'static {
    async_stream::try_stream! {
        let mut conn = conn;
        {
            let mut fetched = sqlx::query(&sql).fetch(&mut conn);
            while let Some(row) = fetched
                .try_next()
                .await
                .map_err(|e| WebcatError::query(&query_id, e.to_string()))?
            {
                yield convert_row(&row);
            }
        }
        conn.close().await.map_err(|e| close_error(&query_id, e))?;
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Decodes by the storage class of the value itself, since SQLite columns
/// are not bound to one type.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => raw.type_info().name().to_uppercase(),
        _ => return Value::Null,
    };

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(Value::from),
        "REAL" => row.try_get::<f64, _>(index).map(Value::from),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(Value::from),
        _ => row.try_get::<String, _>(index).map(Value::from),
    };

    value.unwrap_or(Value::Null)
}
