//! Query result types for webcat.
//!
//! Defines the structures used to represent query results: single values,
//! rows, lazily produced result sets and the bundles handed to the renderer.

use crate::config::QuerySpec;
use crate::error::{Result, WebcatError};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::fmt;

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Lazy sequence of rows. Pulled one row at a time, never restarted.
pub type RowStream = BoxStream<'static, Result<Row>>;

/// Field names plus a row sequence whose arity matches them.
pub struct ResultSet {
    field_names: Vec<String>,
    rows: RowStream,
    materialized: bool,
}

impl ResultSet {
    /// Creates a result set over a lazily produced row sequence.
    ///
    /// Every row is checked against the field count as it is produced; a
    /// mismatch ends the sequence with an internal error.
    pub fn new<S>(field_names: Vec<String>, rows: S) -> Self
    where
        S: Stream<Item = Result<Row>> + Send + 'static,
    {
        let arity = field_names.len();
        let rows = rows
            .map(move |row| {
                let row = row?;
                if row.len() != arity {
                    return Err(WebcatError::internal(format!(
                        "row has {} values but the result has {arity} fields",
                        row.len()
                    )));
                }
                Ok(row)
            })
            .boxed();

        Self {
            field_names,
            rows,
            materialized: false,
        }
    }

    /// Creates a result set over rows that are already in memory.
    pub fn materialized(field_names: Vec<String>, rows: Vec<Row>) -> Self {
        let mut result = Self::new(field_names, stream::iter(rows.into_iter().map(Ok)));
        result.materialized = true;
        result
    }

    /// Returns the field names in result order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Returns true if every row was already in memory when the set was built.
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Returns the row sequence for incremental pulling.
    pub fn rows_mut(&mut self) -> &mut RowStream {
        &mut self.rows
    }

    /// Splits the set into its field names and row sequence.
    pub fn into_parts(self) -> (Vec<String>, RowStream) {
        (self.field_names, self.rows)
    }

    /// Drains the remaining rows into memory.
    pub async fn collect_rows(self) -> Result<Vec<Row>> {
        self.rows.try_collect().await
    }

    /// Pulls every remaining row now and returns an in-memory result set.
    pub async fn buffer(self) -> Result<Self> {
        if self.materialized {
            return Ok(self);
        }
        let field_names = self.field_names.clone();
        let rows = self.collect_rows().await?;
        Ok(Self::materialized(field_names, rows))
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("field_names", &self.field_names)
            .field("materialized", &self.materialized)
            .finish_non_exhaustive()
    }
}

/// The packaged output of one configured query.
#[derive(Debug)]
pub struct ResultBundle {
    pub id: String,
    pub title: String,
    pub result: ResultSet,
}

impl ResultBundle {
    /// Packages a result set under the id and title of its query.
    pub fn new(spec: &QuerySpec, result: ResultSet) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.title.clone(),
            result,
        }
    }
}

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to its display representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
