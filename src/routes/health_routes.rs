//! Liveness endpoint.

use crate::state::AppState;
use axum::{Router, routing::get};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Answers `OK` without touching GitHub, so health checks do not spend API quota.
async fn health_check() -> &'static str {
    "OK"
}
