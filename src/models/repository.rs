use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository's snapshot as assembled by a source for a single scrape cycle.
///
/// The scalar fields decode straight from the GitHub `GET /repos/{owner}/{repo}`
/// payload. Releases, pull requests and the latest release come from separate
/// endpoints and are attached by the source afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Datum {
    pub name: String,
    pub owner: Owner,
    /// GitHub reports `null` for repositories without a detected license.
    pub license: Option<License>,
    pub language: Option<String>,
    pub archived: bool,
    pub private: bool,
    pub fork: bool,
    pub forks: u64,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    /// Includes open pull requests, see [`Datum::open_issues_excluding_pulls`].
    pub open_issues: u64,
    #[serde(rename = "subscribers_count")]
    pub watchers: u64,
    /// Repository size in KB.
    pub size: u64,
    #[serde(skip)]
    pub releases: Vec<Release>,
    #[serde(skip)]
    pub pulls: Vec<PullRequest>,
    #[serde(skip)]
    pub latest_release: Option<LatestRelease>,
}

impl Datum {
    pub fn license_key(&self) -> &str {
        self.license
            .as_ref()
            .map(|license| license.key.as_str())
            .unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or_default()
    }

    pub fn pull_request_count(&self) -> usize {
        self.pulls.len()
    }

    /// The issues API counts pull requests as issues, so the reported figure
    /// is corrected by the number of open pull requests.
    pub fn open_issues_excluding_pulls(&self) -> f64 {
        self.open_issues as f64 - self.pull_request_count() as f64
    }

    pub fn latest_release_tag(&self) -> &str {
        self.latest_release
            .as_ref()
            .map(|release| release.tag.as_str())
            .unwrap_or_default()
    }

    /// Publication time of the latest release in UTC epoch seconds, `0` when unknown.
    pub fn latest_release_published_epoch(&self) -> f64 {
        self.latest_release
            .as_ref()
            .and_then(|release| release.published_at)
            .map(|published| published.timestamp() as f64)
            .unwrap_or(0.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Owner {
    pub login: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct License {
    pub key: String,
}

/// A release entry from `GET /repos/{owner}/{repo}/releases`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Release {
    pub name: Option<String>,
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Drafts have no publication time.
    pub published_at: Option<DateTime<Utc>>,
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Asset {
    pub name: String,
    pub size: u64,
    #[serde(rename = "download_count")]
    pub downloads: u64,
    /// Kept verbatim, it is only ever used as a label value.
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PullRequest {
    pub url: String,
    pub user: Option<Owner>,
}

/// Summary of `GET /repos/{owner}/{repo}/releases/latest`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LatestRelease {
    #[serde(rename = "tag_name")]
    pub tag: String,
    pub published_at: Option<DateTime<Utc>>,
}
