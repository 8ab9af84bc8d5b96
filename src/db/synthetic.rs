//! Synthetic query source for development without database servers.
//!
//! Fabricates deterministic placeholder rows, pausing between rows to imitate
//! the latency of a real server.

use super::{DelayPolicy, QuerySource, ResultSet, Row, Value};
use crate::config::QuerySpec;
use crate::error::{Result, WebcatError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Query source that makes up its rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticQuerySource;

impl SyntheticQuerySource {
    /// Creates a new synthetic source.
    pub fn new() -> Self {
        Self
    }

    /// Builds the result set for a query using the given delay producer.
    ///
    /// Rows are produced on demand. The producer is called once before every
    /// row except the first, so `n` rows cost `n - 1` pauses.
    pub fn result_set<F>(spec: &QuerySpec, mut delay: F) -> Result<ResultSet>
    where
        F: FnMut() -> Duration + Send + 'static,
    {
        let (nrows, nfields) = shape(spec)?;
        let id = spec.id.clone();
        let field_names = field_names(&id, nfields);

        let rows = async_stream::stream! {
            for r in 0..nrows {
                if r > 0 {
                    let pause = delay();
                    if !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                }
                debug!(query = %id, row = r, "producing synthetic row");
                yield Ok(row(&id, nfields, r));
            }
        };

        Ok(ResultSet::new(field_names, rows))
    }
}

#[async_trait]
impl QuerySource for SyntheticQuerySource {
    fn check(&self, spec: &QuerySpec) -> Result<()> {
        shape(spec)?;
        DelayPolicy::resolve(spec)?;
        Ok(())
    }

    async fn execute(&self, spec: &QuerySpec) -> Result<ResultSet> {
        let policy = DelayPolicy::resolve(spec)?;
        Self::result_set(spec, policy.into_fn())
    }
}

fn shape(spec: &QuerySpec) -> Result<(usize, usize)> {
    match (spec.synthetic_rows, spec.synthetic_fields) {
        (Some(nrows), Some(nfields)) => Ok((nrows, nfields)),
        _ => Err(WebcatError::config(format!(
            "Query '{}' needs _nrows and _nfields for synthetic data",
            spec.id
        ))),
    }
}

/// Field names `<id>-field-<n>`.
pub fn field_names(id: &str, nfields: usize) -> Vec<String> {
    (0..nfields).map(|n| format!("{id}-field-{n}")).collect()
}

/// Row `r` with values `<id>-value-<field>-<r>`.
pub fn row(id: &str, nfields: usize, r: usize) -> Row {
    (0..nfields)
        .map(|n| Value::from(format!("{id}-value-{n}-{r}")))
        .collect()
}
