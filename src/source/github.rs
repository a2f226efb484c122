use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{Batch, Source, SourceError};
use crate::config::GithubConfig;
use crate::models::{Datum, LatestRelease, PullRequest, RateLimits, Release};
use crate::utils::log_throttle::should_emit;

const USER_AGENT: &str = concat!("github-exporter/", env!("CARGO_PKG_VERSION"));
const NO_RELEASE_LOG_WINDOW: Duration = Duration::from_secs(300);
const PAGE_SIZE: u32 = 100;
const MAX_PAGES: usize = 100;

/// A repository to scrape, parsed from `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn parse(reference: &str) -> Result<Self, SourceError> {
        match reference.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepositoryRef {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(SourceError::InvalidRepository(reference.to_string())),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Deserialize)]
struct RateLimitResponse {
    rate: RateLimits,
}

/// Fetches repositories from the GitHub REST API.
pub struct GithubSource {
    client: Client,
    api_url: String,
    token: Option<String>,
    repositories: Vec<RepositoryRef>,
}

impl GithubSource {
    pub fn new(config: &GithubConfig) -> Result<Self, SourceError> {
        let repositories = config
            .repositories
            .iter()
            .map(|reference| RepositoryRef::parse(reference))
            .collect::<Result<Vec<_>, _>>()?;
        reject_duplicates(&repositories)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .map_err(SourceError::Client)?;

        info!(
            "Creating GitHub source for {} repositories at '{}'",
            repositories.len(),
            config.api_url
        );

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            repositories,
        })
    }

    pub fn repositories(&self) -> &[RepositoryRef] {
        &self.repositories
    }

    async fn send(&self, url: String) -> Result<(String, Response), SourceError> {
        debug!("Sending GitHub API request to: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        match request.send().await {
            Ok(response) => Ok((url, response)),
            Err(source) => Err(SourceError::Request { url, source }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        self.get_optional_json(path)
            .await?
            .ok_or_else(|| SourceError::Status {
                url: format!("{}{}", self.api_url, path),
                status: StatusCode::NOT_FOUND,
            })
    }

    /// Like `get_json`, but a 404 is reported as `None`.
    async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, SourceError> {
        let (url, response) = self.send(format!("{}{}", self.api_url, path)).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        match response.json::<T>().await {
            Ok(body) => Ok(Some(body)),
            Err(source) => Err(SourceError::Request { url, source }),
        }
    }

    /// Collects every page of a listing by following `Link: rel="next"`.
    async fn get_paginated_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut next = Some(format!("{}{}", self.api_url, path));

        for _ in 0..MAX_PAGES {
            let Some(page_url) = next.take() else {
                return Ok(items);
            };
            let (url, response) = self.send(page_url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Status { url, status });
            }

            next = next_page_url(response.headers());
            match response.json::<Vec<T>>().await {
                Ok(mut page) => items.append(&mut page),
                Err(source) => return Err(SourceError::Request { url, source }),
            }
        }

        if next.is_some() {
            warn!(
                path,
                pages = MAX_PAGES,
                items = items.len(),
                "listing has more pages than will be followed, counts are truncated"
            );
        }
        Ok(items)
    }

    async fn fetch_repository(&self, repository: &RepositoryRef) -> Result<Datum, SourceError> {
        let base = format!("/repos/{}/{}", repository.owner, repository.name);

        let mut datum: Datum = self.get_json(&base).await?;
        datum.releases = self
            .get_paginated_json::<Release>(&format!("{}/releases?per_page={}", base, PAGE_SIZE))
            .await?;
        datum.pulls = self
            .get_paginated_json::<PullRequest>(&format!(
                "{}/pulls?state=open&per_page={}",
                base, PAGE_SIZE
            ))
            .await?;
        datum.latest_release = self
            .get_optional_json::<LatestRelease>(&format!("{}/releases/latest", base))
            .await?;

        if datum.latest_release.is_none() {
            let key = format!("source.github.latest_release.absent:{}", repository);
            if let Some(suppressed_count) = should_emit(&key, NO_RELEASE_LOG_WINDOW) {
                debug!(
                    repository = %repository,
                    suppressed_count,
                    "repository has no published release"
                );
            }
        }

        Ok(datum)
    }

    async fn fetch_rate_limits(&self) -> Result<RateLimits, SourceError> {
        let response: RateLimitResponse = self.get_json("/rate_limit").await?;
        Ok(response.rate)
    }
}

/// GitHub names are case-insensitive, and the API answers with the canonical
/// spelling, so two entries differing only in case would yield the same series.
fn reject_duplicates(repositories: &[RepositoryRef]) -> Result<(), SourceError> {
    let mut seen = HashSet::new();
    for repository in repositories {
        if !seen.insert(repository.to_string().to_lowercase()) {
            return Err(SourceError::DuplicateRepository(repository.to_string()));
        }
    }
    Ok(())
}

/// Target of the `rel="next"` entry in a `Link` header, if any.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        params
            .split(';')
            .any(|param| param.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

#[async_trait]
impl Source for GithubSource {
    fn get_name(&self) -> &str {
        "github"
    }

    async fn fetch(&self) -> Result<Batch, SourceError> {
        let mut data = Vec::with_capacity(self.repositories.len());
        for repository in &self.repositories {
            data.push(self.fetch_repository(repository).await?);
        }
        let rates = self.fetch_rate_limits().await?;

        Ok(Batch { data, rates })
    }
}
