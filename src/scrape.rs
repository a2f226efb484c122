//! One fetch-then-emit pass.

use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::metrics::{
    emit, exposition, ChannelSink, EmitError, ExpositionError, Metrics, MetricsRecorder,
    Observation, Registry,
};
use crate::source::{Source, SourceError};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetching data failed: {0}")]
    Fetch(#[from] SourceError),
    #[error("emitting observations failed: {0}")]
    Emit(#[from] EmitError),
    #[error("rendering observations failed: {0}")]
    Exposition(#[from] ExpositionError),
}

impl ScrapeError {
    /// Value of the `result` label on the exporter's scrape metrics.
    pub fn result_label(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(_) => "fetch_error",
            ScrapeError::Emit(_) => "emit_error",
            ScrapeError::Exposition(_) => "exposition_error",
        }
    }
}

/// Fetches a fresh batch from `source` and runs the emitter over it.
///
/// Observations travel through a bounded channel that is drained while the
/// emitter runs. Any failure fails the whole cycle; partial output is dropped.
pub async fn collect(
    registry: &Registry,
    source: &dyn Source,
    settings: &ScrapeConfig,
) -> Result<Vec<Observation>, ScrapeError> {
    let batch = source.fetch().await?;
    debug!(
        source = source.get_name(),
        repositories = batch.data.len(),
        "fetched scrape batch"
    );

    let (sender, receiver) = mpsc::channel(settings.channel_capacity.max(1));
    let timeout = settings.sink_timeout();
    let emission = async move {
        let mut sink = ChannelSink::new(sender, timeout);
        emit(registry, &batch.data, &batch.rates, &mut sink).await
    };

    let (emitted, observations) = tokio::join!(emission, drain(receiver));
    let written = emitted?;
    debug!(written, received = observations.len(), "drained observations");

    Ok(observations)
}

async fn drain(mut receiver: mpsc::Receiver<Observation>) -> Vec<Observation> {
    let mut observations = Vec::new();
    while let Some(observation) = receiver.recv().await {
        observations.push(observation);
    }
    observations
}

/// Runs a full scrape cycle and renders it, exporter metrics included.
///
/// The cycle is recorded once its repository families are built, so a
/// successful cycle shows up in its own exposition and a failed one is never
/// counted as a success.
pub async fn scrape(
    registry: &Registry,
    source: &dyn Source,
    settings: &ScrapeConfig,
    metrics: &Metrics,
) -> Result<String, ScrapeError> {
    let started = Instant::now();
    let outcome = collect(registry, source, settings)
        .await
        .and_then(|observations| {
            let families = exposition::families(registry, &observations)?;
            Ok((observations.len(), families))
        });

    let result = match &outcome {
        Ok(_) => "success",
        Err(e) => e.result_label(),
    };
    metrics.record_scrape(result);
    metrics.record_scrape_duration(started.elapsed().as_secs_f64(), result);

    let (observed, mut families) = match outcome {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!(result, "scrape cycle failed: {}", e);
            return Err(e);
        }
    };
    metrics.record_observations(observed);

    families.extend(metrics.gather());
    let text = exposition::encode(&families)?;
    info!(
        observations = observed,
        duration_ms = started.elapsed().as_millis() as u64,
        "scrape cycle complete"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::descriptor::{NAMESPACE, REPO_LABELS, REPO_SUBSYSTEM};
    use crate::metrics::{build_registry, MetricDescriptor, MetricKey};
    use crate::models::{Datum, LatestRelease, Owner, RateLimits};
    use crate::source::Batch;
    use async_trait::async_trait;

    struct FixedSource(Batch);

    #[async_trait]
    impl Source for FixedSource {
        fn get_name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> Result<Batch, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl Source for BrokenSource {
        fn get_name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self) -> Result<Batch, SourceError> {
            Err(SourceError::InvalidRepository("broken".to_string()))
        }
    }

    fn batch() -> Batch {
        Batch {
            data: vec![Datum {
                name: "demo".into(),
                owner: Owner {
                    login: "octo".into(),
                },
                latest_release: Some(LatestRelease {
                    tag: "v1.0".into(),
                    published_at: None,
                }),
                ..Default::default()
            }],
            rates: RateLimits {
                limit: 5000.0,
                remaining: 4999.0,
                reset: 1_700_000_000.0,
            },
        }
    }

    #[tokio::test]
    async fn collects_through_a_small_channel() {
        let registry = build_registry();
        // Capacity 1 forces the emitter and the drain to interleave.
        let settings = ScrapeConfig {
            channel_capacity: 1,
            sink_timeout_in_ms: 1_000,
        };

        let observations = collect(&registry, &FixedSource(batch()), &settings)
            .await
            .expect("collect should succeed");

        assert_eq!(observations.len(), 8 + 3);
        assert_eq!(observations[0].key(), MetricKey::LatestRelease);
        assert_eq!(
            observations.last().map(Observation::key),
            Some(MetricKey::Reset)
        );
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let registry = build_registry();
        let settings = ScrapeConfig {
            channel_capacity: 0,
            sink_timeout_in_ms: 1_000,
        };

        let observations = collect(&registry, &FixedSource(Batch::default()), &settings)
            .await
            .expect("collect should succeed");
        assert_eq!(observations.len(), 3);
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_cycle() {
        let registry = build_registry();
        let result = collect(&registry, &BrokenSource, &ScrapeConfig::default()).await;

        match result {
            Err(e) => assert_eq!(e.result_label(), "fetch_error"),
            Ok(_) => panic!("expected the cycle to fail"),
        }
    }

    #[tokio::test]
    async fn scrape_renders_repository_and_exporter_metrics() {
        let registry = build_registry();
        let metrics = Metrics::new();

        let text = scrape(
            &registry,
            &FixedSource(batch()),
            &ScrapeConfig::default(),
            &metrics,
        )
        .await
        .expect("scrape should succeed");

        assert!(text.contains("github_rate_limit 5000"));
        assert!(text.contains("github_repo_latest_release{"));
        assert!(text.contains(r#"github_exporter_scrapes_total{result="success"} 1"#));
        assert!(text.contains("github_exporter_observations 11"));
    }

    #[tokio::test]
    async fn failed_scrape_is_counted() {
        let registry = build_registry();
        let metrics = Metrics::new();

        let result = scrape(&registry, &BrokenSource, &ScrapeConfig::default(), &metrics).await;
        assert!(matches!(result, Err(ScrapeError::Fetch(_))));

        let text = scrape(
            &registry,
            &FixedSource(batch()),
            &ScrapeConfig::default(),
            &metrics,
        )
        .await
        .expect("scrape should succeed");
        assert!(text.contains(r#"github_exporter_scrapes_total{result="fetch_error"} 1"#));
    }

    fn registry_without(missing: MetricKey) -> Registry {
        Registry::from_descriptors(
            build_registry()
                .descriptors()
                .filter(|descriptor| descriptor.key() != missing)
                .map(|descriptor| (**descriptor).clone()),
        )
    }

    fn exporter_metrics(metrics: &Metrics) -> String {
        exposition::encode(&metrics.gather()).expect("exporter metrics should encode")
    }

    #[tokio::test]
    async fn emission_abort_fails_the_cycle_and_drops_partial_output() {
        // PullRequestCount comes late in the pass, so earlier observations
        // have already crossed the channel when emission stops.
        let registry = registry_without(MetricKey::PullRequestCount);
        let settings = ScrapeConfig {
            channel_capacity: 1,
            sink_timeout_in_ms: 1_000,
        };

        let result = collect(&registry, &FixedSource(batch()), &settings).await;

        match result {
            Err(ScrapeError::Emit(EmitError::MissingDescriptor(key))) => {
                assert_eq!(key, MetricKey::PullRequestCount)
            }
            Err(other) => panic!("expected an emit error, got {other:?}"),
            Ok(observations) => panic!("expected failure, got {} observations", observations.len()),
        }
    }

    #[tokio::test]
    async fn emission_abort_is_counted_as_emit_error() {
        let registry = registry_without(MetricKey::PullRequestCount);
        let metrics = Metrics::new();

        let result = scrape(
            &registry,
            &FixedSource(batch()),
            &ScrapeConfig::default(),
            &metrics,
        )
        .await;
        assert!(matches!(result, Err(ScrapeError::Emit(_))));

        let text = exporter_metrics(&metrics);
        assert!(text.contains(r#"github_exporter_scrapes_total{result="emit_error"} 1"#));
        assert!(!text.contains(r#"result="success""#));
    }

    #[tokio::test]
    async fn exposition_failure_is_not_counted_as_success() {
        let mut descriptors: Vec<MetricDescriptor> = build_registry()
            .descriptors()
            .map(|descriptor| (**descriptor).clone())
            .collect();
        // Forks reuses the Stars name, which prometheus refuses to register twice.
        descriptors.push(MetricDescriptor::new(
            MetricKey::Forks,
            NAMESPACE,
            REPO_SUBSYSTEM,
            "stars",
            "Total number of Stars for given repository",
            REPO_LABELS,
        ));
        let registry = Registry::from_descriptors(descriptors);
        let metrics = Metrics::new();

        let result = scrape(
            &registry,
            &FixedSource(batch()),
            &ScrapeConfig::default(),
            &metrics,
        )
        .await;
        assert!(matches!(result, Err(ScrapeError::Exposition(_))));

        let text = exporter_metrics(&metrics);
        assert!(text.contains(r#"github_exporter_scrapes_total{result="exposition_error"} 1"#));
        assert!(!text.contains(r#"result="success""#));
    }
}
