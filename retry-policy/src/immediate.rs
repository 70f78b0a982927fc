//! Retry without pausing.

use crate::context::RetryContext;
use crate::operation::Operation;
use crate::policy::Policy;
use crate::step::drive;
use async_trait::async_trait;

/// Retries as soon as an attempt is rejected or fails retryably.
///
/// The unbounded form runs until a value is accepted or a fatal failure
/// occurs; an operation that always fails retryably keeps it spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Immediate {
    /// Attempt budget, `None` for unbounded.
    pub max_attempts: Option<u32>,
}

impl Default for Immediate {
    fn default() -> Self {
        Self::attempts(Self::DEFAULT_ATTEMPTS)
    }
}

impl Immediate {
    /// Attempts made by [`Immediate::default`].
    pub const DEFAULT_ATTEMPTS: u32 = 3;

    /// Retry without bound.
    #[must_use]
    pub fn forever() -> Self {
        Self { max_attempts: None }
    }

    /// Make at most `max` attempts. The last attempt's outcome is returned
    /// as-is.
    #[must_use]
    pub fn attempts(max: u32) -> Self {
        Self {
            max_attempts: Some(max),
        }
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for Immediate
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        drive(operation, context, self.max_attempts, || None).await
    }
}
