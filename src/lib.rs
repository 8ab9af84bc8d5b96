//! webcat - a text file and a handful of database query results on one page.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod web;
