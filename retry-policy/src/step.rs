//! The retry step shared by every strategy, plus the attempt countdown.
//!
//! A step runs one attempt and sorts its outcome. The loop in [`drive`] is
//! iterative, so an unbounded chain never grows the stack however many
//! attempts it takes.

use crate::classify::FailureClass;
use crate::context::RetryContext;
use crate::operation::Operation;
use crate::success::Success;
use std::time::Duration;
use tracing::{debug, warn};

/// Sorted outcome of a single attempt.
#[derive(Debug)]
pub(crate) enum Verdict<T, E> {
    /// An accepted value or a fatal failure. Either way the chain ends here.
    Settled(Result<T, E>),
    /// A value the success predicate did not accept.
    Rejected(T),
    /// A failure the classifier considers retryable.
    Failed(E),
}

/// Run one attempt and judge it against `success` and the context's classifier.
pub(crate) async fn attempt<T, E>(
    operation: &dyn Operation<T, E>,
    context: &RetryContext<T, E>,
    success: &Success<T>,
) -> Verdict<T, E>
where
    T: 'static,
    E: 'static,
{
    match operation.attempt().await {
        Ok(value) if success.evaluate(&value) => Verdict::Settled(Ok(value)),
        Ok(value) => Verdict::Rejected(value),
        Err(error) => match context.classifier.classify(&error) {
            FailureClass::Retryable => Verdict::Failed(error),
            FailureClass::Fatal => {
                warn!("Fatal failure, abandoning retry chain");
                Verdict::Settled(Err(error))
            }
        },
    }
}

/// Remaining attempt budget of a bounded strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// A budget of `max_attempts`; zero is treated as a single attempt.
    pub(crate) fn new(max_attempts: u32) -> Self {
        Self {
            remaining: max_attempts.max(1),
        }
    }

    /// Consume one attempt. Returns `true` when it was the last one.
    pub(crate) fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining < 1
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Attempt `operation` until a step settles or the budget runs out.
///
/// `max_attempts = None` retries without bound. On the last permitted attempt
/// the success predicate is forced, so that attempt's outcome is returned as
/// it is. `next_delay` is asked once per retry for the pause before it; when
/// it has none the loop still yields to the runtime before the next attempt.
pub(crate) async fn drive<T, E, D>(
    operation: &dyn Operation<T, E>,
    context: &RetryContext<T, E>,
    max_attempts: Option<u32>,
    mut next_delay: D,
) -> Result<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    D: FnMut() -> Option<Duration> + Send,
{
    let mut countdown = max_attempts.map(Countdown::new);
    let mut attempt_no: u64 = 0;

    loop {
        attempt_no += 1;
        let last = countdown.as_mut().is_some_and(Countdown::tick);
        let success = context.success.or(last);

        debug!(
            attempt = attempt_no,
            max_attempts = ?max_attempts,
            "Executing retry attempt"
        );

        match attempt(operation, context, &success).await {
            Verdict::Settled(result) => return result,
            Verdict::Failed(error) if last => {
                warn!(attempt = attempt_no, "Attempt budget exhausted");
                return Err(error);
            }
            Verdict::Rejected(_) => {
                debug!(attempt = attempt_no, "Result rejected by success predicate");
            }
            Verdict::Failed(_) => {
                debug!(attempt = attempt_no, "Attempt failed with a retryable error");
            }
        }

        match next_delay() {
            Some(delay) => {
                debug!(
                    attempt = attempt_no,
                    wait_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    remaining = ?countdown.map(|c| c.remaining()),
                    "Waiting before retry"
                );
                context.timer.sleep(delay).await;
            }
            // Give deadlines and sibling tasks a turn between back-to-back attempts.
            None => tokio::task::yield_now().await,
        }
    }
}
