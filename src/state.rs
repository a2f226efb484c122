//! Shared application state.
//!
//! Contains the state that is shared across all request handlers: the
//! configuration, the descriptor registry, the data source and the exporter's
//! own metrics.

use crate::config::ConfigV1;
use crate::metrics::{Metrics, Registry};
use crate::source::Source;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Descriptor registry, built once and never mutated.
    pub registry: Arc<Registry>,
    /// Provides a fresh batch for every scrape of `/metrics`.
    pub source: Arc<dyn Source>,
    /// Exporter self-metrics.
    pub metrics: Metrics,
}
