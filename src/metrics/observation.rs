use std::sync::Arc;

use super::descriptor::{MetricDescriptor, MetricKey};
use super::error::EmitError;

/// One gauge reading bound to its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    descriptor: Arc<MetricDescriptor>,
    value: f64,
    label_values: Vec<String>,
}

impl Observation {
    /// Fails when the number of label values differs from the descriptor's
    /// label schema.
    pub fn new(
        descriptor: Arc<MetricDescriptor>,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<Self, EmitError> {
        if descriptor.labels().len() != label_values.len() {
            return Err(EmitError::LabelArity {
                metric: descriptor.fq_name().to_string(),
                expected: descriptor.labels().len(),
                actual: label_values.len(),
            });
        }

        Ok(Observation {
            descriptor,
            value,
            label_values,
        })
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> MetricKey {
        self.descriptor.key()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label value for `name`, if the descriptor declares such a label.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels()
            .iter()
            .position(|label| *label == name)
            .and_then(|index| self.label_values.get(index))
            .map(String::as_str)
    }
}
