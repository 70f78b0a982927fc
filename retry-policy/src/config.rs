//! Declarative policy configuration.
//!
//! [`PolicyConfig`] is the serializable description of a strategy, suitable
//! for config files; [`PolicyConfig::build`] validates it into a
//! [`Strategy`], which is itself a [`Policy`].
//!
//! ```json
//! { "strategy": "backoff", "max_attempts": 6, "delay_ms": 100, "max_delay_ms": 5000 }
//! ```

use crate::backoff::Backoff;
use crate::context::RetryContext;
use crate::error::{ConfigError, ConfigResult};
use crate::immediate::Immediate;
use crate::operation::Operation;
use crate::pause::{Pause, DEFAULT_DELAY};
use crate::policy::Policy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serializable description of a retry strategy.
///
/// A missing `max_attempts` means the strategy's default budget; set
/// `forever` for an unbounded chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Retry without pausing.
    Immediate {
        /// Attempt budget.
        #[serde(default)]
        max_attempts: Option<u32>,
        /// Retry without bound.
        #[serde(default)]
        forever: bool,
    },
    /// Retry after a fixed pause.
    Pause {
        /// Attempt budget.
        #[serde(default)]
        max_attempts: Option<u32>,
        /// Retry without bound.
        #[serde(default)]
        forever: bool,
        /// Pause between attempts, in milliseconds.
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
    },
    /// Retry with exponential backoff.
    Backoff {
        /// Attempt budget.
        #[serde(default)]
        max_attempts: Option<u32>,
        /// Retry without bound.
        #[serde(default)]
        forever: bool,
        /// Delay before the first retry, in milliseconds.
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
        /// Growth factor.
        #[serde(default = "default_base")]
        base: u32,
        /// Delay cap, in milliseconds.
        #[serde(default)]
        max_delay_ms: Option<u64>,
    },
}

fn default_delay_ms() -> u64 {
    u64::try_from(DEFAULT_DELAY.as_millis()).unwrap_or(u64::MAX)
}

fn default_base() -> u32 {
    Backoff::DEFAULT_BASE
}

/// Resolve the attempt budget: `None` for unbounded.
fn budget(max_attempts: Option<u32>, forever: bool, default: u32) -> ConfigResult<Option<u32>> {
    match (max_attempts, forever) {
        (Some(_), true) => Err(ConfigError::UnboundedWithLimit),
        (Some(0), false) => Err(ConfigError::ZeroAttempts),
        (Some(n), false) => Ok(Some(n)),
        (None, true) => Ok(None),
        (None, false) => Ok(Some(default)),
    }
}

impl PolicyConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate the configuration and build the strategy it describes.
    pub fn build(&self) -> ConfigResult<Strategy> {
        let strategy = match *self {
            PolicyConfig::Immediate {
                max_attempts,
                forever,
            } => Strategy::Immediate(Immediate {
                max_attempts: budget(max_attempts, forever, Immediate::DEFAULT_ATTEMPTS)?,
            }),
            PolicyConfig::Pause {
                max_attempts,
                forever,
                delay_ms,
            } => Strategy::Pause(Pause {
                max_attempts: budget(max_attempts, forever, Pause::DEFAULT_ATTEMPTS)?,
                delay: Duration::from_millis(delay_ms),
            }),
            PolicyConfig::Backoff {
                max_attempts,
                forever,
                delay_ms,
                base,
                max_delay_ms,
            } => {
                if base == 0 {
                    return Err(ConfigError::InvalidBase(base));
                }
                Strategy::Backoff(Backoff {
                    max_attempts: budget(max_attempts, forever, Backoff::DEFAULT_ATTEMPTS)?,
                    delay: Duration::from_millis(delay_ms),
                    base,
                    max_delay: max_delay_ms.map(Duration::from_millis),
                })
            }
        };
        Ok(strategy)
    }
}

/// One of the built-in strategies, chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// See [`Immediate`].
    Immediate(Immediate),
    /// See [`Pause`].
    Pause(Pause),
    /// See [`Backoff`].
    Backoff(Backoff),
}

impl From<Immediate> for Strategy {
    fn from(policy: Immediate) -> Self {
        Strategy::Immediate(policy)
    }
}

impl From<Pause> for Strategy {
    fn from(policy: Pause) -> Self {
        Strategy::Pause(policy)
    }
}

impl From<Backoff> for Strategy {
    fn from(policy: Backoff) -> Self {
        Strategy::Backoff(policy)
    }
}

impl TryFrom<PolicyConfig> for Strategy {
    type Error = ConfigError;

    fn try_from(config: PolicyConfig) -> ConfigResult<Self> {
        config.build()
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for Strategy
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        match self {
            Strategy::Immediate(policy) => {
                Policy::<T, E>::retry(policy, operation, context).await
            }
            Strategy::Pause(policy) => Policy::<T, E>::retry(policy, operation, context).await,
            Strategy::Backoff(policy) => Policy::<T, E>::retry(policy, operation, context).await,
        }
    }
}
