//! Text exposition of one scrape cycle.

use std::collections::BTreeMap;

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, TextEncoder};

use super::error::ExpositionError;
use super::observation::Observation;
use super::registry::Registry;

/// Content type of the Prometheus text format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders `observations` in Prometheus text format, followed by `extra`
/// families (the exporter's own metrics).
pub fn render(
    registry: &Registry,
    observations: &[Observation],
    extra: Vec<MetricFamily>,
) -> Result<String, ExpositionError> {
    let mut families = families(registry, observations)?;
    families.extend(extra);
    encode(&families)
}

/// Turns `observations` into metric families, one per descriptor that saw at
/// least one observation.
///
/// Gauges live in a registry created for this call only, so series that
/// disappear upstream (a deleted release asset, a renamed repository) vanish
/// from the next scrape instead of lingering with a stale value.
pub fn families(
    registry: &Registry,
    observations: &[Observation],
) -> Result<Vec<MetricFamily>, ExpositionError> {
    let scrape = prometheus::Registry::new();
    let mut gauges = BTreeMap::new();

    for descriptor in registry.descriptors() {
        let opts = Opts::new(descriptor.name(), descriptor.help())
            .namespace(descriptor.namespace())
            .subsystem(descriptor.subsystem());
        let gauge = GaugeVec::new(opts, descriptor.labels())?;
        scrape.register(Box::new(gauge.clone()))?;
        gauges.insert(descriptor.key(), gauge);
    }

    for observation in observations {
        let gauge = gauges
            .get(&observation.key())
            .ok_or(ExpositionError::Unregistered(observation.key()))?;
        let label_values: Vec<&str> = observation
            .label_values()
            .iter()
            .map(String::as_str)
            .collect();
        gauge
            .get_metric_with_label_values(&label_values)?
            .set(observation.value());
    }

    Ok(scrape.gather())
}

pub fn encode(families: &[MetricFamily]) -> Result<String, ExpositionError> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
