//! Metrics exposition endpoint.

use crate::metrics::exposition::CONTENT_TYPE;
use crate::scrape::scrape;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Handler for the /metrics endpoint.
///
/// Every request is one scrape cycle: the configured source is queried, the
/// batch is emitted and rendered in Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HTTPError> {
    let body = scrape(
        &state.registry,
        state.source.as_ref(),
        &state.config.scrape,
        &state.metrics,
    )
    .await?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}
