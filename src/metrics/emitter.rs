//! Maps a fetched batch onto a flat stream of labeled observations.

use std::sync::Arc;

use tracing::debug;

use super::descriptor::MetricKey;
use super::error::EmitError;
use super::observation::Observation;
use super::registry::Registry;
use super::sink::Sink;
use crate::models::{Datum, RateLimits};

/// Emits every observation for one scrape cycle into `sink`.
///
/// Repositories are visited in input order, followed by the three rate-limit
/// gauges. The first failure aborts the pass; nothing is retried. Returns the
/// number of observations written.
pub async fn emit<S>(
    registry: &Registry,
    data: &[Datum],
    rates: &RateLimits,
    sink: &mut S,
) -> Result<usize, EmitError>
where
    S: Sink + ?Sized,
{
    let mut emitter = Emitter {
        registry,
        sink,
        written: 0,
    };

    for datum in data {
        emitter.repository(datum).await?;
    }
    emitter.rate_limits(rates).await?;

    debug!(
        repositories = data.len(),
        observations = emitter.written,
        "emission pass complete"
    );
    Ok(emitter.written)
}

struct Emitter<'a, S: ?Sized> {
    registry: &'a Registry,
    sink: &'a mut S,
    written: usize,
}

impl<S> Emitter<'_, S>
where
    S: Sink + ?Sized,
{
    async fn observe(
        &mut self,
        key: MetricKey,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<(), EmitError> {
        let descriptor = Arc::clone(self.registry.require(key)?);
        let observation = Observation::new(descriptor, value, label_values)?;
        self.sink.accept(observation).await?;
        self.written += 1;
        Ok(())
    }

    async fn repository(&mut self, x: &Datum) -> Result<(), EmitError> {
        let user = x.owner.login.as_str();
        let repo = x.name.as_str();

        self.observe(
            MetricKey::LatestRelease,
            1.0,
            labels(&[user, repo, x.latest_release_tag()]),
        )
        .await?;
        self.observe(
            MetricKey::LatestReleasePublishedTime,
            x.latest_release_published_epoch(),
            labels(&[user, repo]),
        )
        .await?;

        let descriptive = repository_labels(x);
        for (key, value) in [
            (MetricKey::Stars, x.stars),
            (MetricKey::Forks, x.forks),
            (MetricKey::Watchers, x.watchers),
            (MetricKey::Size, x.size),
        ] {
            self.observe(key, value as f64, descriptive.clone()).await?;
        }

        for release in &x.releases {
            for asset in &release.assets {
                self.observe(
                    MetricKey::ReleaseDownloads,
                    asset.downloads as f64,
                    labels(&[
                        user,
                        repo,
                        release.name(),
                        asset.name.as_str(),
                        release.tag.as_str(),
                        asset.created_at.as_str(),
                    ]),
                )
                .await?;
            }
        }

        self.observe(
            MetricKey::OpenIssues,
            x.open_issues_excluding_pulls(),
            descriptive,
        )
        .await?;
        self.observe(
            MetricKey::PullRequestCount,
            x.pull_request_count() as f64,
            labels(&[user, repo]),
        )
        .await
    }

    async fn rate_limits(&mut self, rates: &RateLimits) -> Result<(), EmitError> {
        self.observe(MetricKey::Limit, rates.limit, Vec::new()).await?;
        self.observe(MetricKey::Remaining, rates.remaining, Vec::new())
            .await?;
        self.observe(MetricKey::Reset, rates.reset, Vec::new()).await
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Values for the `user, repo, private, fork, archived, license, language` schema.
fn repository_labels(x: &Datum) -> Vec<String> {
    vec![
        x.owner.login.clone(),
        x.name.clone(),
        x.private.to_string(),
        x.fork.to_string(),
        x.archived.to_string(),
        x.license_key().to_string(),
        x.language().to_string(),
    ]
}
