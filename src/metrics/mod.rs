//! Metric descriptors, emission and exposition.
//!
//! The registry is built once at startup. Every scrape cycle runs the emitter
//! over freshly fetched data, and the resulting observations are rendered in
//! Prometheus text format together with the exporter's own metrics.

pub mod descriptor;
pub mod emitter;
pub mod error;
pub mod exposition;
pub mod observation;
mod recorder;
pub mod registry;
pub mod sink;

pub use descriptor::{MetricDescriptor, MetricKey};
pub use emitter::emit;
pub use error::{EmitError, ExpositionError, SinkError};
pub use observation::Observation;
pub use recorder::{Metrics, MetricsRecorder};
pub use registry::{Registry, build_registry};
pub use sink::{ChannelSink, CollectingSink, Sink};
