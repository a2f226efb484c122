//! The exporter's own metrics, recorded with the prometheus crate.

use prometheus::proto::MetricFamily;
use prometheus::{
    CounterVec, HistogramVec, IntGauge, Opts, Registry, register_counter_vec_with_registry,
    register_histogram_vec_with_registry, register_int_gauge_with_registry,
};
use std::sync::Arc;

/// Trait for recording scrape outcomes.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records a finished scrape cycle with its outcome.
    fn record_scrape(&self, result: &str);

    /// Records the duration of a scrape cycle.
    fn record_scrape_duration(&self, duration_secs: f64, result: &str);

    /// Records the number of observations produced by the last good scrape.
    fn record_observations(&self, count: usize);
}

/// Prometheus metrics collector for the exporter itself.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    scrapes_total: CounterVec,
    scrape_duration_seconds: HistogramVec,
    observations: IntGauge,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let scrapes_total = register_counter_vec_with_registry!(
            Opts::new(
                "github_exporter_scrapes_total",
                "Total number of scrape cycles by result"
            ),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register github_exporter_scrapes_total");

        let scrape_duration_seconds = register_histogram_vec_with_registry!(
            "github_exporter_scrape_duration_seconds",
            "Scrape cycle duration in seconds, fetch included",
            &["result"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0],
            registry.clone()
        )
        .expect("Failed to register github_exporter_scrape_duration_seconds");

        let observations = register_int_gauge_with_registry!(
            Opts::new(
                "github_exporter_observations",
                "Number of observations emitted by the last successful scrape"
            ),
            registry.clone()
        )
        .expect("Failed to register github_exporter_observations");

        Metrics {
            registry,
            scrapes_total,
            scrape_duration_seconds,
            observations,
        }
    }

    /// Snapshot of the exporter metric families, appended to each exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_scrape(&self, result: &str) {
        self.scrapes_total.with_label_values(&[result]).inc();
    }

    fn record_scrape_duration(&self, duration_secs: f64, result: &str) {
        self.scrape_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_observations(&self, count: usize) {
        self.observations.set(count as i64);
    }
}
