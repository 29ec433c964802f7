//! Error types for windowgate.

use thiserror::Error;

/// Main error type for windowgate operations.
#[derive(Error, Debug)]
pub enum WindowgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A limiter was constructed with a zero request budget or window
    #[error("Invalid limit: max_requests={max_requests}, window_millis={window_millis} (both must be positive)")]
    InvalidLimit {
        max_requests: u64,
        window_millis: u64,
    },

    /// The guarded action was not performed because its boundary is saturated
    #[error("Rate limit exceeded for boundary '{boundary}'")]
    RateLimitExceeded { boundary: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for windowgate operations.
pub type Result<T> = std::result::Result<T, WindowgateError>;
