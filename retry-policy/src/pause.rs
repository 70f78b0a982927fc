//! Retry after a fixed pause.

use crate::context::RetryContext;
use crate::operation::Operation;
use crate::policy::Policy;
use crate::step::drive;
use async_trait::async_trait;
use std::time::Duration;

/// Delay used when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Waits the same delay before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    /// Attempt budget, `None` for unbounded.
    pub max_attempts: Option<u32>,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for Pause {
    fn default() -> Self {
        Self::attempts(Self::DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl Pause {
    /// Attempts made by [`Pause::default`].
    pub const DEFAULT_ATTEMPTS: u32 = 4;

    /// Retry without bound, waiting `delay` between attempts.
    #[must_use]
    pub fn forever(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    /// Make at most `max` attempts, waiting `delay` between them.
    #[must_use]
    pub fn attempts(max: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max),
            delay,
        }
    }

    /// Set the delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for Pause
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        let delay = self.delay;
        drive(operation, context, self.max_attempts, move || Some(delay)).await
    }
}
