//! Metric keys and their static descriptors.

use std::fmt;

pub const NAMESPACE: &str = "github";
pub const REPO_SUBSYSTEM: &str = "repo";
pub const RATE_SUBSYSTEM: &str = "rate";

/// Labels shared by the per-repository counters (stars, forks, ...).
pub const REPO_LABELS: &[&str] = &[
    "user", "repo", "private", "fork", "archived", "license", "language",
];

/// Short name of every metric the exporter knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    Stars,
    OpenIssues,
    PullRequestCount,
    Watchers,
    Forks,
    Size,
    ReleaseDownloads,
    Limit,
    Remaining,
    Reset,
    LatestRelease,
    LatestReleasePublishedTime,
}

impl MetricKey {
    pub const ALL: [MetricKey; 12] = [
        MetricKey::Stars,
        MetricKey::OpenIssues,
        MetricKey::PullRequestCount,
        MetricKey::Watchers,
        MetricKey::Forks,
        MetricKey::Size,
        MetricKey::ReleaseDownloads,
        MetricKey::Limit,
        MetricKey::Remaining,
        MetricKey::Reset,
        MetricKey::LatestRelease,
        MetricKey::LatestReleasePublishedTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Stars => "Stars",
            MetricKey::OpenIssues => "OpenIssues",
            MetricKey::PullRequestCount => "PullRequestCount",
            MetricKey::Watchers => "Watchers",
            MetricKey::Forks => "Forks",
            MetricKey::Size => "Size",
            MetricKey::ReleaseDownloads => "ReleaseDownloads",
            MetricKey::Limit => "Limit",
            MetricKey::Remaining => "Remaining",
            MetricKey::Reset => "Reset",
            MetricKey::LatestRelease => "LatestRelease",
            MetricKey::LatestReleasePublishedTime => "LatestReleasePublishedTime",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of one gauge: its fully qualified name, help text and
/// ordered label schema. Label values supplied at emission time must follow
/// the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    key: MetricKey,
    namespace: &'static str,
    subsystem: &'static str,
    name: &'static str,
    fq_name: String,
    help: &'static str,
    labels: Vec<&'static str>,
}

impl MetricDescriptor {
    pub fn new(
        key: MetricKey,
        namespace: &'static str,
        subsystem: &'static str,
        name: &'static str,
        help: &'static str,
        labels: &[&'static str],
    ) -> Self {
        MetricDescriptor {
            key,
            namespace,
            subsystem,
            name,
            fq_name: fq_name(namespace, subsystem, name),
            help,
            labels: labels.to_vec(),
        }
    }

    pub fn key(&self) -> MetricKey {
        self.key
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn subsystem(&self) -> &'static str {
        self.subsystem
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `<namespace>_<subsystem>_<name>`, e.g. `github_repo_stars`.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &'static str {
        self.help
    }

    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }
}

/// Joins the non-empty parts with `_`, matching how the prometheus crate
/// builds names from `Opts` namespace and subsystem.
fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
