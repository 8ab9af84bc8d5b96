//! Aggregation of configured queries into ordered result bundles.
//!
//! The aggregator dispatches every query specification to its query source
//! and hands back the bundles in configuration order, either fully computed
//! or as a lazy sequence the renderer pulls from.

use std::sync::Arc;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, info};

use crate::config::{Config, QuerySpec};
use crate::db::{LiveQuerySource, QuerySource, ResultBundle, SyntheticQuerySource};
use crate::error::Result;

/// Ordered sequence of bundles, one per query specification.
pub type BundleStream = BoxStream<'static, Result<ResultBundle>>;

/// Turns query specifications into result bundles.
#[derive(Clone)]
pub struct ResultAggregator {
    source: Arc<dyn QuerySource>,
    streaming: bool,
}

impl ResultAggregator {
    /// Creates an aggregator over the given query source.
    pub fn new(source: Arc<dyn QuerySource>, streaming: bool) -> Self {
        Self { source, streaming }
    }

    /// Creates the aggregator a configuration describes.
    ///
    /// Without servers every query goes through the synthetic source.
    pub fn from_config(config: &Config) -> Self {
        let streaming = config.streaming();
        let source: Arc<dyn QuerySource> = if config.is_synthetic() {
            Arc::new(SyntheticQuerySource::new())
        } else {
            Arc::new(LiveQuerySource::new(config.servers.clone(), streaming))
        };

        info!(
            synthetic = config.is_synthetic(),
            streaming, "result aggregator configured"
        );
        Self::new(source, streaming)
    }

    /// Returns true if bundles are produced lazily.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Produces the ordered bundle sequence for the given queries.
    ///
    /// Every query is checked before anything runs, so configuration errors
    /// are returned here in both modes. In eager mode every query has also
    /// run and every row is in memory when this returns. In streaming mode a
    /// query runs only when its bundle is pulled, and its failure ends the
    /// sequence.
    pub async fn aggregate(&self, specs: Vec<QuerySpec>) -> Result<BundleStream> {
        for spec in &specs {
            self.source.check(spec)?;
        }

        if self.streaming {
            return Ok(lazy_bundles(self.source.clone(), specs).boxed());
        }

        let mut bundles = Vec::with_capacity(specs.len());
        for spec in &specs {
            debug!(query = %spec.id, "aggregating eagerly");
            let result = self.source.execute(spec).await?.buffer().await?;
            bundles.push(ResultBundle::new(spec, result));
        }

        Ok(stream::iter(bundles.into_iter().map(Ok)).boxed())
    }
}

fn lazy_bundles(
    source: Arc<dyn QuerySource>,
    specs: Vec<QuerySpec>,
) -> impl Stream<Item = Result<ResultBundle>> + Send + 'static {
    async_stream::try_stream! {
        for spec in specs {
            debug!(query = %spec.id, "aggregating lazily");
            let result = source.execute(&spec).await?;
            yield ResultBundle::new(&spec, result);
        }
    }
}
