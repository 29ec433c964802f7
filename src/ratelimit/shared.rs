//! Thread-safe limiter handle bound to a clock.

use std::sync::Arc;

use parking_lot::Mutex;

use super::clock::{Clock, Millis};
use super::window::SlidingWindowLimiter;

/// A [`SlidingWindowLimiter`] that can be shared across tasks.
///
/// Access to the timestamp history is serialized by a mutex, and the current
/// instant is read from the injected clock.
pub struct SharedLimiter {
    limiter: Mutex<SlidingWindowLimiter>,
    clock: Arc<dyn Clock>,
}

impl SharedLimiter {
    /// Wrap a limiter and bind it to `clock`.
    pub fn new(limiter: SlidingWindowLimiter, clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter: Mutex::new(limiter),
            clock,
        }
    }

    /// Try to admit a request at the clock's current instant.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(self.clock.now_millis())
    }

    /// Try to admit a request at an explicit instant.
    pub fn try_acquire_at(&self, now: Millis) -> bool {
        self.limiter.lock().try_acquire(now)
    }

    /// Remaining capacity at the clock's current instant.
    pub fn remaining_capacity(&self) -> u64 {
        self.remaining_capacity_at(self.clock.now_millis())
    }

    /// Remaining capacity at an explicit instant.
    pub fn remaining_capacity_at(&self, now: Millis) -> u64 {
        self.limiter.lock().remaining_capacity(now)
    }

    pub fn max_requests(&self) -> u64 {
        self.limiter.lock().max_requests()
    }

    pub fn window_millis(&self) -> u64 {
        self.limiter.lock().window_millis()
    }
}

impl std::fmt::Debug for SharedLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLimiter")
            .field("limiter", &*self.limiter.lock())
            .finish_non_exhaustive()
    }
}
