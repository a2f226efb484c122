use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where and what to fetch from GitHub.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Personal access token, sent as `Authorization: token <token>`.
    #[serde(default)]
    pub token: Option<String>,
    /// Repositories as `owner/name`.
    pub repositories: Vec<String>,
    #[serde(default = "default_github_timeout")]
    pub timeout_in_ms: u64,
}

/// Tuning of the emission hand-off between the emitter and the exposition.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ScrapeConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Upper bound for a single observation write.
    #[serde(default = "default_sink_timeout")]
    pub sink_timeout_in_ms: u64,
}

impl ScrapeConfig {
    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_in_ms)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            channel_capacity: default_channel_capacity(),
            sink_timeout_in_ms: default_sink_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_timeout() -> u64 {
    10_000
}

fn default_channel_capacity() -> usize {
    256
}

fn default_sink_timeout() -> u64 {
    5_000
}
