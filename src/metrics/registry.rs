//! The descriptor registry: built once at startup, read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::descriptor::{
    MetricDescriptor, MetricKey, NAMESPACE, RATE_SUBSYSTEM, REPO_LABELS, REPO_SUBSYSTEM,
};
use super::error::EmitError;

/// Immutable mapping from metric key to descriptor.
///
/// Shared behind an `Arc` for the lifetime of the process; nothing mutates it
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: BTreeMap<MetricKey, Arc<MetricDescriptor>>,
}

impl Registry {
    /// Builds a registry from an arbitrary set of descriptors. A later
    /// descriptor with the same key replaces an earlier one.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = MetricDescriptor>) -> Self {
        Registry {
            descriptors: descriptors
                .into_iter()
                .map(|descriptor| (descriptor.key(), Arc::new(descriptor)))
                .collect(),
        }
    }

    pub fn get(&self, key: MetricKey) -> Option<&Arc<MetricDescriptor>> {
        self.descriptors.get(&key)
    }

    /// Like [`Registry::get`], but a missing key is a registry-integrity error.
    pub fn require(&self, key: MetricKey) -> Result<&Arc<MetricDescriptor>, EmitError> {
        self.get(key).ok_or(EmitError::MissingDescriptor(key))
    }

    /// Checks that every known metric key has a descriptor.
    pub fn verify(&self) -> Result<(), EmitError> {
        MetricKey::ALL
            .iter()
            .try_for_each(|key| self.require(*key).map(|_| ()))
    }

    /// Descriptors in key order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<MetricDescriptor>> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn repo(key: MetricKey, name: &'static str, help: &'static str, labels: &[&'static str]) -> MetricDescriptor {
    MetricDescriptor::new(key, NAMESPACE, REPO_SUBSYSTEM, name, help, labels)
}

fn rate(key: MetricKey, name: &'static str, help: &'static str) -> MetricDescriptor {
    MetricDescriptor::new(key, NAMESPACE, RATE_SUBSYSTEM, name, help, &[])
}

/// Builds the registry of every metric the exporter publishes.
pub fn build_registry() -> Registry {
    Registry::from_descriptors([
        repo(
            MetricKey::Stars,
            "stars",
            "Total number of Stars for given repository",
            REPO_LABELS,
        ),
        repo(
            MetricKey::OpenIssues,
            "open_issues",
            "Total number of open issues for given repository",
            REPO_LABELS,
        ),
        repo(
            MetricKey::PullRequestCount,
            "pull_request_count",
            "Total number of pull requests for given repository",
            &["user", "repo"],
        ),
        repo(
            MetricKey::Watchers,
            "watchers",
            "Total number of watchers/subscribers for given repository",
            REPO_LABELS,
        ),
        repo(
            MetricKey::Forks,
            "forks",
            "Total number of forks for given repository",
            REPO_LABELS,
        ),
        repo(
            MetricKey::Size,
            "size_kb",
            "Size in KB for given repository",
            REPO_LABELS,
        ),
        repo(
            MetricKey::ReleaseDownloads,
            "release_downloads",
            "Download count for a given release",
            &["user", "repo", "release", "name", "tag", "created_at"],
        ),
        rate(
            MetricKey::Limit,
            "limit",
            "Number of API queries allowed in a 60 minute window",
        ),
        rate(
            MetricKey::Remaining,
            "remaining",
            "Number of API queries remaining in the current window",
        ),
        rate(
            MetricKey::Reset,
            "reset",
            "The time at which the current rate limit window resets in UTC epoch seconds",
        ),
        repo(
            MetricKey::LatestRelease,
            "latest_release",
            "The latest release tag of a GitHub repository",
            &["user", "repo", "tag"],
        ),
        repo(
            MetricKey::LatestReleasePublishedTime,
            "latest_release_timestamp",
            "The latest release published timestamp of a GitHub repository",
            &["user", "repo"],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_key() {
        let registry = build_registry();
        assert_eq!(registry.len(), MetricKey::ALL.len());
        assert!(registry.verify().is_ok());
    }

    #[test]
    fn names_follow_namespace_subsystem_name() {
        let registry = build_registry();
        let name = |key| registry.get(key).map(|d| d.fq_name().to_string());

        assert_eq!(name(MetricKey::Stars).as_deref(), Some("github_repo_stars"));
        assert_eq!(name(MetricKey::Size).as_deref(), Some("github_repo_size_kb"));
        assert_eq!(
            name(MetricKey::LatestRelease).as_deref(),
            Some("github_repo_latest_release")
        );
        assert_eq!(
            name(MetricKey::LatestReleasePublishedTime).as_deref(),
            Some("github_repo_latest_release_timestamp")
        );
        assert_eq!(name(MetricKey::Limit).as_deref(), Some("github_rate_limit"));

        for descriptor in registry.descriptors() {
            let expected_prefix = match descriptor.key() {
                MetricKey::Limit | MetricKey::Remaining | MetricKey::Reset => "github_rate_",
                _ => "github_repo_",
            };
            assert!(
                descriptor.fq_name().starts_with(expected_prefix),
                "{} does not start with {}",
                descriptor.fq_name(),
                expected_prefix
            );
            assert!(!descriptor.help().is_empty());
        }
    }

    #[test]
    fn label_schemas_match_table() {
        let registry = build_registry();
        let labels = |key| registry.get(key).map(|d| d.labels().len());

        for key in [
            MetricKey::Stars,
            MetricKey::OpenIssues,
            MetricKey::Watchers,
            MetricKey::Forks,
            MetricKey::Size,
        ] {
            assert_eq!(labels(key), Some(7), "{key}");
        }
        assert_eq!(labels(MetricKey::PullRequestCount), Some(2));
        assert_eq!(labels(MetricKey::ReleaseDownloads), Some(6));
        assert_eq!(labels(MetricKey::LatestRelease), Some(3));
        assert_eq!(labels(MetricKey::LatestReleasePublishedTime), Some(2));
        assert_eq!(labels(MetricKey::Limit), Some(0));
        assert_eq!(labels(MetricKey::Remaining), Some(0));
        assert_eq!(labels(MetricKey::Reset), Some(0));
    }

    #[test]
    fn verify_reports_first_missing_key() {
        let partial = Registry::from_descriptors(
            build_registry()
                .descriptors()
                .filter(|d| d.key() != MetricKey::Reset)
                .map(|d| (**d).clone()),
        );

        match partial.verify() {
            Err(EmitError::MissingDescriptor(key)) => assert_eq!(key, MetricKey::Reset),
            other => panic!("expected a missing descriptor, got {other:?}"),
        }
    }
}
