//! Exponential backoff.

use crate::context::RetryContext;
use crate::operation::Operation;
use crate::pause::DEFAULT_DELAY;
use crate::policy::Policy;
use crate::step::drive;
use async_trait::async_trait;
use std::time::Duration;

/// Waits a geometrically growing delay before every retry.
///
/// The delays are `delay, delay * base, delay * base^2, ...`, each step
/// clamped to `max_delay` when one is set. The cap is applied to the running
/// delay, so once reached it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Attempt budget, `None` for unbounded.
    pub max_attempts: Option<u32>,
    /// Delay before the first retry.
    pub delay: Duration,
    /// Growth factor per retry. Values below 1 behave as 1.
    pub base: u32,
    /// Upper bound for any single delay, `None` for uncapped growth.
    pub max_delay: Option<Duration>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::attempts(Self::DEFAULT_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl Backoff {
    /// Attempts made by [`Backoff::default`].
    pub const DEFAULT_ATTEMPTS: u32 = 8;
    /// Growth factor used unless configured.
    pub const DEFAULT_BASE: u32 = 2;

    /// Retry without bound, starting at `delay`.
    #[must_use]
    pub fn forever(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
            base: Self::DEFAULT_BASE,
            max_delay: None,
        }
    }

    /// Make at most `max` attempts, starting at `delay`.
    #[must_use]
    pub fn attempts(max: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max),
            ..Self::forever(delay)
        }
    }

    /// Set the growth factor. Values below 1 are raised to 1 so delays never
    /// shrink.
    #[must_use]
    pub fn base(mut self, base: u32) -> Self {
        self.base = base.max(1);
        self
    }

    /// Cap every delay at `max_delay`.
    #[must_use]
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Remove the delay cap.
    #[must_use]
    pub fn uncapped(mut self) -> Self {
        self.max_delay = None;
        self
    }

    /// The delays this strategy waits, in order.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule::new(self.delay, self.base, self.max_delay)
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for Backoff
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        let mut schedule = self.schedule();
        drive(operation, context, self.max_attempts, move || schedule.next()).await
    }
}

/// Endless iterator over backoff delays.
///
/// Non-decreasing (a `base` of 0 is treated as 1), never above the cap when
/// there is one, and saturating at [`Duration::MAX`] otherwise.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    current: Duration,
    base: u32,
    max_delay: Option<Duration>,
}

impl BackoffSchedule {
    /// Start a schedule at `delay`.
    pub fn new(delay: Duration, base: u32, max_delay: Option<Duration>) -> Self {
        let mut schedule = Self {
            current: delay,
            base: base.max(1),
            max_delay,
        };
        schedule.current = schedule.cap(delay);
        schedule
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.current;
        let grown = delay.checked_mul(self.base).unwrap_or(Duration::MAX);
        self.current = self.cap(grown);
        Some(delay)
    }
}
