//! Query aggregation for webcat.
//!
//! This module turns the configured query list into the ordered result
//! bundles the page renderer consumes.

pub mod aggregator;

pub use aggregator::{BundleStream, ResultAggregator};
