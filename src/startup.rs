//! Application startup and server initialization.
//!
//! Builds the descriptor registry, the GitHub source and the HTTP server, then
//! serves until the process is stopped.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::metrics::{Metrics, build_registry};
use crate::routes;
use crate::source::{GithubSource, Source};
use crate::state::AppState;

/// Initializes and runs the exporter.
///
/// # Errors
///
/// Returns an error if the registry is incomplete, the configured repositories
/// are invalid, or the server fails to bind or serve. All of these are fatal.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(build_registry());
    registry.verify()?;
    info!("Descriptor registry ready with {} metrics", registry.len());

    let source: Arc<dyn Source> = Arc::new(GithubSource::new(&config.github)?);

    let state = AppState {
        config: config.clone(),
        registry,
        source,
        metrics: Metrics::new(),
    };

    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
