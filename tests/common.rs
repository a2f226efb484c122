#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use chrono::{TimeZone, Utc};
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use github_exporter::config::{ConfigV1, from_figment};
use github_exporter::metrics::{Metrics, Registry, build_registry};
use github_exporter::models::{
    Asset, Datum, LatestRelease, License, Owner, PullRequest, RateLimits, Release,
};
use github_exporter::routes::create_router;
use github_exporter::source::{Batch, Source, SourceError};
use github_exporter::state::AppState;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:9171
github:
  api_url: http://127.0.0.1:1
  repositories:
    - octo/demo
scrape:
  channel_capacity: 4
  sink_timeout_in_ms: 1000
logging:
  level: "debug"
  format: "json"
"#;

pub fn load_test_config() -> ConfigV1 {
    from_figment(Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML")
}

/// Serves a fixed batch, standing in for the GitHub API.
pub struct StaticSource {
    pub batch: Batch,
}

#[async_trait]
impl Source for StaticSource {
    fn get_name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Batch, SourceError> {
        Ok(self.batch.clone())
    }
}

/// Always fails, like an unreachable GitHub API.
pub struct UnavailableSource;

#[async_trait]
impl Source for UnavailableSource {
    fn get_name(&self) -> &str {
        "unavailable"
    }

    async fn fetch(&self) -> Result<Batch, SourceError> {
        Err(SourceError::InvalidRepository("unreachable".to_string()))
    }
}

pub fn build_app(source: Arc<dyn Source>) -> Router {
    build_app_with_registry(source, build_registry())
}

pub fn build_app_with_registry(source: Arc<dyn Source>, registry: Registry) -> Router {
    let state = AppState {
        config: Arc::new(load_test_config()),
        registry: Arc::new(registry),
        source,
        metrics: Metrics::new(),
    };
    create_router(state)
}

pub fn request(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn rates() -> RateLimits {
    RateLimits {
        limit: 5000.0,
        remaining: 4999.0,
        reset: 1_700_000_000.0,
    }
}

pub fn demo_datum() -> Datum {
    Datum {
        name: "demo".into(),
        owner: Owner {
            login: "octo".into(),
        },
        license: Some(License { key: "mit".into() }),
        language: Some("Rust".into()),
        stars: 42,
        forks: 5,
        watchers: 3,
        size: 2048,
        open_issues: 10,
        pulls: vec![PullRequest::default(); 3],
        releases: vec![Release {
            name: Some("First".into()),
            tag: "v1.0".into(),
            published_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single(),
            assets: vec![Asset {
                name: "demo.tar.gz".into(),
                downloads: 17,
                created_at: "2023-01-01T00:00:00Z".into(),
                ..Default::default()
            }],
        }],
        latest_release: Some(LatestRelease {
            tag: "v1.0".into(),
            published_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single(),
        }),
        ..Default::default()
    }
}
