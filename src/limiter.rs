//! Sliding-window admission control for outbound AI requests.
//!
//! Admitted-request timestamps are persisted through the [`StateStore`]
//! and pruned to the trailing window on every check. Check-and-record is
//! one logical operation: a denied attempt is not recorded and leaves
//! the persisted window unchanged.
//!
//! Bypassing the limiter (e.g. replaying a cached-but-evicted history
//! item) is an explicit flag at the gateway call site, never a property
//! of the limiter itself.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::{self, StateStore, keys};
use crate::telemetry;

/// Maximum admitted requests per window.
pub const RATE_LIMIT_COUNT: usize = 5;

/// Trailing admission window, milliseconds.
pub const RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed and has been recorded.
    Granted,
    /// The window is full; the caller must wait.
    Denied {
        /// Whole seconds until a slot frees up, at least 1.
        retry_after_seconds: u64,
    },
}

impl Admission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted)
    }
}

/// Persisted sliding-window rate limiter.
pub struct RateLimiter {
    store: Arc<dyn StateStore>,
    max_requests: usize,
    window_ms: u64,
}

impl RateLimiter {
    /// Create a limiter with the default limits
    /// ([`RATE_LIMIT_COUNT`] per [`RATE_LIMIT_WINDOW_MS`]).
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_limits(store, RATE_LIMIT_COUNT, RATE_LIMIT_WINDOW_MS)
    }

    /// Create a limiter with custom limits.
    pub fn with_limits(store: Arc<dyn StateStore>, max_requests: usize, window_ms: u64) -> Self {
        Self {
            store,
            max_requests,
            window_ms,
        }
    }

    /// Check-and-record against the current clock.
    pub fn try_admit(&self) -> Admission {
        self.try_admit_at(crate::now_epoch_ms())
    }

    /// Check-and-record against an explicit timestamp.
    ///
    /// Prunes the persisted window to entries younger than the window
    /// size, then either denies (window full, state unchanged) or
    /// appends `now_ms` and persists the pruned sequence atomically.
    pub fn try_admit_at(&self, now_ms: u64) -> Admission {
        let mut recent = self.pruned_window(now_ms);

        if recent.len() >= self.max_requests {
            let retry_after_seconds = self.seconds_until_slot(&recent, now_ms);
            warn!(
                in_window = recent.len(),
                retry_after_seconds, "request denied by admission window"
            );
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            return Admission::Denied {
                retry_after_seconds,
            };
        }

        recent.push(now_ms);
        store::write_json(self.store.as_ref(), keys::REQUEST_TIMESTAMPS, &recent);
        debug!(in_window = recent.len(), "request admitted");
        Admission::Granted
    }

    /// Admission decision without recording anything.
    ///
    /// Lets a UI disable its submit affordance pre-emptively; the
    /// recording check still runs on the actual submission.
    pub fn preview(&self) -> Admission {
        self.preview_at(crate::now_epoch_ms())
    }

    /// Non-recording decision against an explicit timestamp.
    pub fn preview_at(&self, now_ms: u64) -> Admission {
        let recent = self.pruned_window(now_ms);
        if recent.len() >= self.max_requests {
            Admission::Denied {
                retry_after_seconds: self.seconds_until_slot(&recent, now_ms),
            }
        } else {
            Admission::Granted
        }
    }

    /// Persisted timestamps still inside the trailing window, oldest
    /// first.
    fn pruned_window(&self, now_ms: u64) -> Vec<u64> {
        let timestamps: Vec<u64> =
            store::read_json(self.store.as_ref(), keys::REQUEST_TIMESTAMPS).unwrap_or_default();
        timestamps
            .into_iter()
            .filter(|&ts| now_ms.saturating_sub(ts) < self.window_ms)
            .collect()
    }

    /// Whole seconds until the oldest in-window entry ages out, at
    /// least 1.
    fn seconds_until_slot(&self, recent: &[u64], now_ms: u64) -> u64 {
        let oldest = recent.first().copied().unwrap_or(now_ms);
        let wait_ms = self.window_ms.saturating_sub(now_ms.saturating_sub(oldest));
        wait_ms.div_ceil(1000).max(1)
    }
}
