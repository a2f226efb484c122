//! Library exports for github-exporter, shared between the binary and tests.

pub mod config;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod scrape;
pub mod source;
pub mod startup;
pub mod state;
pub mod utils;
