//! Rate limiting for log lines that would otherwise repeat on every scrape.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Tracks one suppression window per key.
#[derive(Debug, Default)]
pub struct LogThrottle {
    windows: Mutex<HashMap<String, Window>>,
}

impl LogThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
    /// otherwise `None` and the event is counted against the active window.
    pub fn should_emit(&self, key: &str, interval: Duration, now: Instant) -> Option<u64> {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(window) = windows.get_mut(key) else {
            windows.insert(
                key.to_string(),
                Window {
                    started_at: now,
                    suppressed: 0,
                },
            );
            return Some(0);
        };

        if now.duration_since(window.started_at) < interval {
            window.suppressed += 1;
            return None;
        }

        let suppressed = window.suppressed;
        window.started_at = now;
        window.suppressed = 0;
        Some(suppressed)
    }
}

static GLOBAL: OnceLock<LogThrottle> = OnceLock::new();

/// [`LogThrottle::should_emit`] against a process-wide throttle.
pub fn should_emit(key: &str, interval: Duration) -> Option<u64> {
    GLOBAL
        .get_or_init(LogThrottle::new)
        .should_emit(key, interval, Instant::now())
}
