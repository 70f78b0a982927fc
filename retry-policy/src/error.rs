//! Configuration error types.
//!
//! Retry chains never produce errors of their own: a caller always gets back
//! the operation's `Result`. These errors only come out of building policies
//! from declarative configuration.

use thiserror::Error;

/// Errors raised while validating or parsing a policy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A bounded strategy was configured with no attempts at all.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// A backoff base that would shrink delays.
    #[error("backoff base must be at least 1, got {0}")]
    InvalidBase(u32),

    /// Both an attempt limit and `forever` were requested.
    #[error("max_attempts cannot be combined with forever")]
    UnboundedWithLimit,

    /// The configuration document could not be decoded.
    #[error("Invalid policy configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
