pub mod rate_limits;
pub mod repository;

// Re-export so callers can do "use crate::models::{Datum, RateLimits};"
pub use rate_limits::RateLimits;
pub use repository::{Asset, Datum, LatestRelease, License, Owner, PullRequest, Release};
