//! Where a scrape cycle's data comes from.

mod github;

pub use github::{GithubSource, RepositoryRef};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{Datum, RateLimits};

/// Everything one scrape cycle needs: the repositories and the quota window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub data: Vec<Datum>,
    pub rates: RateLimits,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),
    #[error("repository '{0}' is listed more than once")]
    DuplicateRepository(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Produces a fresh [`Batch`] for every scrape cycle.
#[async_trait]
pub trait Source: Send + Sync {
    fn get_name(&self) -> &str;
    async fn fetch(&self) -> Result<Batch, SourceError>;
}
