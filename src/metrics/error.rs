//! Error types of the emission pipeline.

use std::time::Duration;

use thiserror::Error;

use super::descriptor::MetricKey;

/// Failure of the output sink. Ends the current scrape cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("observation sink is closed")]
    Closed,
    #[error("observation sink did not accept an observation within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum EmitError {
    /// The registry and the emitter disagree on the set of metrics. This is a
    /// build inconsistency, never a transient condition.
    #[error("metric '{0}' is not present in the descriptor registry")]
    MissingDescriptor(MetricKey),
    #[error("metric '{metric}' expects {expected} label values, got {actual}")]
    LabelArity {
        metric: String,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("metric '{0}' has no gauge in the exposition registry")]
    Unregistered(MetricKey),
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("exposition output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
