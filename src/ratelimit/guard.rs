//! Admission check in front of an outbound action.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::shared::SharedLimiter;
use crate::error::{Result, WindowgateError};

/// Runs actions only when the boundary's limiter admits them.
///
/// A denied action is never run and never retried; the caller receives
/// [`WindowgateError::RateLimitExceeded`] instead.
#[derive(Debug, Clone)]
pub struct GuardedCaller {
    boundary: String,
    limiter: Arc<SharedLimiter>,
}

impl GuardedCaller {
    pub fn new(boundary: impl Into<String>, limiter: Arc<SharedLimiter>) -> Self {
        Self {
            boundary: boundary.into(),
            limiter,
        }
    }

    /// Admit and run `action`, or reject it without running it.
    pub async fn call<F, Fut, T>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.limiter.try_acquire() {
            warn!(boundary = %self.boundary, "Rate limit exceeded");
            return Err(WindowgateError::RateLimitExceeded {
                boundary: self.boundary.clone(),
            });
        }

        debug!(
            boundary = %self.boundary,
            remaining = self.limiter.remaining_capacity(),
            "Call allowed"
        );
        Ok(action().await)
    }

    pub fn remaining_capacity(&self) -> u64 {
        self.limiter.remaining_capacity()
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{ManualClock, SlidingWindowLimiter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn caller(max: u64, window: u64) -> (GuardedCaller, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = SlidingWindowLimiter::new(max, window).unwrap();
        let shared = Arc::new(SharedLimiter::new(limiter, clock.clone()));
        (GuardedCaller::new("api", shared), clock)
    }

    #[tokio::test]
    async fn test_admitted_call_runs_action() {
        let (caller, _clock) = caller(2, 1000);

        let value = caller.call(|| async { 42 }).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(caller.remaining_capacity(), 1);
    }

    #[tokio::test]
    async fn test_denied_call_skips_action() {
        let (caller, _clock) = caller(1, 1000);
        let counter = AtomicUsize::new(0);
        let runs = &counter;

        caller
            .call(move || async move { runs.fetch_add(1, Ordering::SeqCst) })
            .await
            .unwrap();

        let err = caller
            .call(move || async move { runs.fetch_add(1, Ordering::SeqCst) })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WindowgateError::RateLimitExceeded { ref boundary } if boundary == "api"
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_from_sync_context() {
        let (caller, _clock) = caller(1, 1000);

        let value = tokio_test::block_on(caller.call(|| async { "ok" })).unwrap();
        assert_eq!(value, "ok");
        assert!(tokio_test::block_on(caller.call(|| async {})).is_err());
    }

    #[tokio::test]
    async fn test_capacity_returns_after_window() {
        let (caller, clock) = caller(1, 1000);

        assert!(caller.call(|| async {}).await.is_ok());
        assert!(caller.call(|| async {}).await.is_err());

        clock.advance(1000);
        assert!(caller.call(|| async {}).await.is_ok());
    }

    #[tokio::test]
    async fn test_action_errors_pass_through() {
        let (caller, _clock) = caller(1, 1000);

        let inner: std::result::Result<(), &str> =
            caller.call(|| async { Err("upstream failed") }).await.unwrap();
        assert_eq!(inner, Err("upstream failed"));
        assert_eq!(caller.boundary(), "api");
    }
}
