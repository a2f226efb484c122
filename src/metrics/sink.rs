//! Destinations for emitted observations.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

use super::error::SinkError;
use super::observation::Observation;

/// Accepts observations one at a time.
#[async_trait]
pub trait Sink: Send {
    async fn accept(&mut self, observation: Observation) -> Result<(), SinkError>;
}

/// Hands observations to a bounded channel drained by the exposition side.
///
/// Every write is bounded by `timeout`, so a consumer that stops draining
/// cannot stall the emission pass.
pub struct ChannelSink {
    sender: mpsc::Sender<Observation>,
    timeout: Duration,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Observation>, timeout: Duration) -> Self {
        ChannelSink { sender, timeout }
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn accept(&mut self, observation: Observation) -> Result<(), SinkError> {
        let timeout = self.timeout;
        self.sender
            .send_timeout(observation, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Closed(_) => SinkError::Closed,
                SendTimeoutError::Timeout(_) => SinkError::Timeout(timeout),
            })
    }
}

/// Keeps every observation in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    observations: Vec<Observation>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }
}

#[async_trait]
impl Sink for CollectingSink {
    async fn accept(&mut self, observation: Observation) -> Result<(), SinkError> {
        self.observations.push(observation);
        Ok(())
    }
}
