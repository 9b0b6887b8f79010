//! Timeout helpers used across the crate.
//!
//! Centralizes the default reply deadline and a small [`Deadline`] type the
//! endpoints use to wait for replies without drifting when the wait is
//! interrupted.

use std::time::{Duration, Instant};

/// Default time an exchange waits for its reply, in milliseconds.
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 1000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default reply timeout as Duration.
pub fn default_reply_timeout() -> Duration {
    ms(DEFAULT_REPLY_TIMEOUT_MS)
}

/// Stand-in horizon for timeouts too large to add to `Instant::now()`.
pub const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// `from + by`, clamped to a far-future instant instead of overflowing.
fn saturating_add(from: Instant, by: Duration) -> Instant {
    from.checked_add(by)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// A point in time an operation must finish by.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: saturating_add(Instant::now(), timeout),
        }
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Push the deadline back by `by`.
    pub fn extend(&mut self, by: Duration) {
        self.at = saturating_add(self.at, by);
    }
}
