//! Named limiter instances built from configuration.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::clock::Clock;
use super::shared::SharedLimiter;
use super::window::SlidingWindowLimiter;
use crate::config::WindowgateConfig;
use crate::error::Result;

/// Holds one limiter per rate-limited boundary.
///
/// Every limiter in a registry reads the same clock.
#[derive(Debug, Default)]
pub struct LimiterRegistry {
    limiters: HashMap<String, Arc<SharedLimiter>>,
}

impl LimiterRegistry {
    /// Build a limiter for every boundary in `config`.
    pub fn from_config(config: &WindowgateConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut limiters = HashMap::with_capacity(config.limits.len());

        for (name, rule) in &config.limits {
            let limiter = SlidingWindowLimiter::new(rule.max_requests, rule.window_ms)?;
            debug!(
                boundary = %name,
                max_requests = rule.max_requests,
                window_ms = rule.window_ms,
                "Creating limiter"
            );
            limiters.insert(
                name.clone(),
                Arc::new(SharedLimiter::new(limiter, clock.clone())),
            );
        }

        Ok(Self { limiters })
    }

    /// Get the limiter for a boundary.
    pub fn get(&self, name: &str) -> Option<Arc<SharedLimiter>> {
        self.limiters.get(name).cloned()
    }

    /// Boundary names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.limiters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitRule, DEFAULT_BOUNDARY};
    use crate::error::WindowgateError;
    use crate::ratelimit::ManualClock;

    #[test]
    fn test_default_config_builds_api_limiter() {
        let clock = Arc::new(ManualClock::new(0));
        let registry = LimiterRegistry::from_config(&WindowgateConfig::default(), clock).unwrap();

        assert_eq!(registry.len(), 1);
        let api = registry.get(DEFAULT_BOUNDARY).unwrap();
        assert_eq!(api.max_requests(), 10);
        assert_eq!(api.window_millis(), 60_000);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_boundaries_are_isolated() {
        let mut config = WindowgateConfig::default();
        config.limits.insert(
            "search".to_string(),
            LimitRule {
                max_requests: 1,
                window_ms: 1000,
            },
        );
        let registry =
            LimiterRegistry::from_config(&config, Arc::new(ManualClock::new(0))).unwrap();

        let search = registry.get("search").unwrap();
        assert!(search.try_acquire());
        assert!(!search.try_acquire());

        let api = registry.get(DEFAULT_BOUNDARY).unwrap();
        assert_eq!(api.remaining_capacity(), 10);
        assert_eq!(registry.names(), vec!["api", "search"]);
    }

    #[test]
    fn test_handles_share_state() {
        let registry = LimiterRegistry::from_config(
            &WindowgateConfig::default(),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();

        let first = registry.get(DEFAULT_BOUNDARY).unwrap();
        let second = registry.get(DEFAULT_BOUNDARY).unwrap();
        assert!(first.try_acquire());
        assert_eq!(second.remaining_capacity(), 9);
    }

    #[test]
    fn test_invalid_rule_fails_construction() {
        let mut config = WindowgateConfig::default();
        config.limits.insert(
            "broken".to_string(),
            LimitRule {
                max_requests: 3,
                window_ms: 0,
            },
        );

        let err = LimiterRegistry::from_config(&config, Arc::new(ManualClock::new(0))).unwrap_err();
        assert!(matches!(err, WindowgateError::InvalidLimit { .. }));
    }

    #[test]
    fn test_empty_registry() {
        let registry = LimiterRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
