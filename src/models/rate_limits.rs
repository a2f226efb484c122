use serde::{Deserialize, Serialize};

/// Quota window of the GitHub API, as reported under `rate` by `GET /rate_limit`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct RateLimits {
    pub limit: f64,
    pub remaining: f64,
    /// UTC epoch seconds at which the window resets.
    pub reset: f64,
}
