//! # retry-policy
//!
//! Composable retry policies for async operations.
//!
//! A [`Policy`] wraps a zero-argument [`Operation`] and keeps re-invoking it
//! until the [`Success`] predicate accepts a settled value, a failure turns
//! out to be fatal, or the strategy's own termination rule fires.
//!
//! ## Core Concepts
//!
//! - **[`Policy`]**: the strategy interface; [`PolicyExt`] adds the `apply`
//!   entry points
//! - **[`Success`]**: decides whether a settled value is done
//! - **[`Classifier`]**: sorts failures into retryable and fatal
//! - **[`RetryContext`]**: success predicate, classifier and [`Timer`] for one call
//! - **[`PolicyConfig`]**: serializable strategy description
//!
//! ## Strategies
//!
//! - [`Immediate`]: retry right away
//! - [`Pause`]: retry after a fixed delay
//! - [`Backoff`]: retry after a geometrically growing, optionally capped delay
//! - [`When`]: hand over to another policy depending on the outcome
//! - [`FailFast`]: abandon the chain on selected failures
//!
//! Every delayed strategy comes in a bounded form (`attempts(n, ..)`) and an
//! unbounded form (`forever(..)`). A bounded strategy makes exactly `n`
//! attempts at most and returns the last attempt's outcome as-is.
//!
//! ## Example
//!
//! ```ignore
//! use retry_policy::prelude::*;
//! use std::time::Duration;
//!
//! let policy = Backoff::attempts(4, Duration::from_millis(10))
//!     .max_delay(Duration::from_millis(30));
//!
//! let context = RetryContext::new()
//!     .succeed_when(|status: &JobStatus| status.is_finished())
//!     .fatal_when(|e: &ApiError| e.is_auth());
//!
//! let status = policy
//!     .apply_with(|| client.job_status(job_id), &context)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod fail_fast;
pub mod immediate;
pub mod operation;
pub mod pause;
pub mod policy;
mod step;
pub mod success;
pub mod timer;
pub mod when;

#[cfg(test)]
mod testing;

// Re-exports
pub use backoff::{Backoff, BackoffSchedule};
pub use classify::{Classifier, FailureClass};
pub use config::{PolicyConfig, Strategy};
pub use context::RetryContext;
pub use error::{ConfigError, ConfigResult};
pub use fail_fast::FailFast;
pub use immediate::Immediate;
pub use operation::{AttemptFuture, Operation};
pub use pause::{Pause, DEFAULT_DELAY};
pub use policy::{Outcome, Policy, PolicyExt};
pub use success::Success;
pub use timer::{Timer, TokioTimer};
pub use when::When;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Backoff, Classifier, FailFast, Immediate, Outcome, Pause, Policy, PolicyExt,
        RetryContext, Success, When,
    };
}
