//! Configuration management for windowgate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{Result, WindowgateError};

/// Name of the boundary present in the default configuration.
pub const DEFAULT_BOUNDARY: &str = "api";

/// Main configuration for windowgate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowgateConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate-limited boundaries, keyed by name
    #[serde(default = "default_limits")]
    pub limits: BTreeMap<String, LimitRule>,
}

impl Default for WindowgateConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            limits: default_limits(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Admission budget for one boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRule {
    /// Maximum requests admitted per window
    pub max_requests: u64,
    /// Trailing window length in milliseconds
    pub window_ms: u64,
}

impl Default for LimitRule {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_ms: 60_000,
        }
    }
}

fn default_limits() -> BTreeMap<String, LimitRule> {
    let mut limits = BTreeMap::new();
    limits.insert(DEFAULT_BOUNDARY.to_string(), LimitRule::default());
    limits
}

impl WindowgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WindowgateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| WindowgateError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every boundary has a usable budget.
    pub fn validate(&self) -> Result<()> {
        for (name, rule) in &self.limits {
            if rule.max_requests == 0 || rule.window_ms == 0 {
                return Err(WindowgateError::Config(format!(
                    "boundary '{}' needs positive max_requests and window_ms (got {} / {})",
                    name, rule.max_requests, rule.window_ms
                )));
            }
        }
        Ok(())
    }

    /// Get the rule for a boundary.
    pub fn limit(&self, name: &str) -> Option<&LimitRule> {
        self.limits.get(name)
    }
}
