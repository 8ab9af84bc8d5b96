//! Integration tests for webcat.

pub mod common;
pub mod web_test;
