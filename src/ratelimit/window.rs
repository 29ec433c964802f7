//! Sliding window limiter implementation.

use std::collections::VecDeque;
use tracing::trace;

use super::clock::Millis;
use crate::error::{Result, WindowgateError};

/// Admits at most `max_requests` requests per trailing `window_millis`.
///
/// Only admitted requests are recorded. Entries that have aged out of the
/// window are pruned lazily on each query, so there is no background timer.
///
/// The limiter has no internal synchronization; wrap it in a
/// [`SharedLimiter`](super::SharedLimiter) to share it between tasks.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    /// Maximum admissions per window
    max_requests: u64,
    /// Trailing window length in milliseconds
    window_millis: u64,
    /// Instants of admitted requests still inside the window
    timestamps: VecDeque<Millis>,
}

impl SlidingWindowLimiter {
    /// Create a limiter with an empty history.
    ///
    /// Both arguments must be non-zero.
    pub fn new(max_requests: u64, window_millis: u64) -> Result<Self> {
        if max_requests == 0 || window_millis == 0 {
            return Err(WindowgateError::InvalidLimit {
                max_requests,
                window_millis,
            });
        }

        Ok(Self {
            max_requests,
            window_millis,
            timestamps: VecDeque::with_capacity(max_requests.min(1024) as usize),
        })
    }

    /// Try to admit a request at `now`.
    ///
    /// Returns `true` and records `now` if fewer than `max_requests`
    /// admissions remain in the window, `false` otherwise. A denied attempt
    /// is not recorded.
    pub fn try_acquire(&mut self, now: Millis) -> bool {
        self.prune(now);

        if (self.timestamps.len() as u64) < self.max_requests {
            self.timestamps.push_back(now);
            trace!(now, in_flight = self.timestamps.len(), "Request admitted");
            true
        } else {
            trace!(now, max_requests = self.max_requests, "Request denied");
            false
        }
    }

    /// Number of requests that would still be admitted at `now`.
    ///
    /// Prunes expired entries as a side effect.
    pub fn remaining_capacity(&mut self, now: Millis) -> u64 {
        self.prune(now);
        self.max_requests.saturating_sub(self.timestamps.len() as u64)
    }

    /// Get the maximum admissions per window.
    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Get the window length in milliseconds.
    pub fn window_millis(&self) -> u64 {
        self.window_millis
    }

    /// Number of recorded admissions as of the last prune.
    pub fn in_flight(&self) -> usize {
        self.timestamps.len()
    }

    /// Drop every timestamp that is `window_millis` old or older.
    ///
    /// An instant earlier than a stored timestamp counts as age zero.
    fn prune(&mut self, now: Millis) {
        let window = self.window_millis;
        self.timestamps.retain(|&t| now.saturating_sub(t) < window);
    }
}
