//! Conditional dispatch on the content of an outcome.

use crate::context::RetryContext;
use crate::operation::Operation;
use crate::policy::{Outcome, Policy};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type Route<T, E> =
    Box<dyn Fn(&Outcome<'_, T, E>) -> Option<Arc<dyn Policy<T, E>>> + Send + Sync>;

/// Picks the next policy from what the first attempt produced.
///
/// `When` runs the operation once. An accepted value, a fatal failure, or an
/// outcome no route claims is returned unchanged. Otherwise the chosen policy
/// takes over with the same operation; it is a hand-off, not a loop back into
/// `When`. Routes are tried in the order they were added and the first match
/// wins.
///
/// # Example
///
/// ```ignore
/// use retry_policy::{Backoff, Immediate, Pause, When};
/// use std::time::Duration;
///
/// let policy = When::new()
///     .on_failure(|e: &ApiError| e.is_throttled(), Backoff::attempts(5, Duration::from_secs(1)))
///     .on_failure(|e: &ApiError| e.is_reset(), Immediate::attempts(2))
///     .route(|outcome| match outcome {
///         Outcome::Failure(e) => e.retry_after().map(|d| Arc::new(Pause::attempts(1, d)) as _),
///         _ => None,
///     });
/// ```
pub struct When<T, E> {
    routes: Vec<Route<T, E>>,
}

impl<T, E> fmt::Debug for When<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("route_count", &self.routes.len())
            .finish()
    }
}

impl<T, E> Default for When<T, E> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T, E> When<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a dispatcher with no routes, which never retries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route that builds the next policy from the outcome, or declines
    /// with `None`.
    #[must_use]
    pub fn route<F>(mut self, route: F) -> Self
    where
        F: Fn(&Outcome<'_, T, E>) -> Option<Arc<dyn Policy<T, E>>> + Send + Sync + 'static,
    {
        self.routes.push(Box::new(route));
        self
    }

    /// Hand rejected values matching `matches` over to `policy`.
    #[must_use]
    pub fn on_value<F, P>(self, matches: F, policy: P) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        P: Policy<T, E> + 'static,
    {
        let policy: Arc<dyn Policy<T, E>> = Arc::new(policy);
        self.route(move |outcome| match *outcome {
            Outcome::Value(value) if matches(value) => Some(Arc::clone(&policy)),
            _ => None,
        })
    }

    /// Hand retryable failures matching `matches` over to `policy`.
    #[must_use]
    pub fn on_failure<F, P>(self, matches: F, policy: P) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
        P: Policy<T, E> + 'static,
    {
        let policy: Arc<dyn Policy<T, E>> = Arc::new(policy);
        self.route(move |outcome| match *outcome {
            Outcome::Failure(error) if matches(error) => Some(Arc::clone(&policy)),
            _ => None,
        })
    }

    /// Find the policy for an outcome. `None` means no route matched.
    pub fn lookup(&self, outcome: &Outcome<'_, T, E>) -> Option<Arc<dyn Policy<T, E>>> {
        self.routes.iter().find_map(|route| route(outcome))
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for When<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        let next = match operation.attempt().await {
            Ok(value) => {
                if context.success.evaluate(&value) {
                    return Ok(value);
                }
                let next = self.lookup(&Outcome::Value(&value));
                match next {
                    Some(policy) => policy,
                    None => {
                        debug!("No route for rejected value, returning it");
                        return Ok(value);
                    }
                }
            }
            Err(error) => {
                if !context.classifier.is_retryable(&error) {
                    warn!("Fatal failure, abandoning retry chain");
                    return Err(error);
                }
                let next = self.lookup(&Outcome::Failure(&error));
                match next {
                    Some(policy) => policy,
                    None => {
                        debug!("No route for failure, returning it");
                        return Err(error);
                    }
                }
            }
        };

        debug!("Delegating to routed policy");
        next.retry(operation, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immediate::Immediate;
    use crate::pause::Pause;
    use crate::policy::PolicyExt;
    use crate::testing::{RecordingTimer, Scripted};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Reply {
        Done(u32),
        Busy,
        Moved,
        Gone,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum ApiError {
        Throttled { retry_after_ms: u64 },
        Reset,
        Invalid,
    }

    fn done(reply: &Reply) -> bool {
        matches!(reply, Reply::Done(_))
    }

    fn dispatcher() -> When<Reply, ApiError> {
        When::new()
            .on_value(|r| *r == Reply::Busy, Pause::attempts(3, Duration::from_millis(7)))
            .on_value(|r| *r == Reply::Moved, Immediate::attempts(2))
    }

    #[tokio::test]
    async fn test_accepted_value_is_not_routed() {
        let context = RetryContext::new().succeed_when(done);
        let op = Scripted::new(vec![Ok(Reply::Done(1)), Ok(Reply::Done(2))]);
        let calls = op.calls();

        assert_eq!(dispatcher().apply_with(op, &context).await, Ok(Reply::Done(1)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_routes_rejected_value_to_mapped_policy() {
        let timer = RecordingTimer::default();
        let context = RetryContext::new().succeed_when(done).timer(timer.clone());
        let op = Scripted::new(vec![
            Ok(Reply::Busy),
            Ok(Reply::Busy),
            Ok(Reply::Done(3)),
        ]);
        let calls = op.calls();

        let result = dispatcher().apply_with(op, &context).await;

        // One dispatch attempt, then two under Pause.
        assert_eq!(result, Ok(Reply::Done(3)));
        assert_eq!(calls.get(), 3);
        assert_eq!(timer.delays(), vec![Duration::from_millis(7)]);
    }

    #[tokio::test]
    async fn test_routes_to_second_policy() {
        let timer = RecordingTimer::default();
        let context = RetryContext::new().succeed_when(done).timer(timer.clone());
        let op = Scripted::new(vec![Ok(Reply::Moved), Ok(Reply::Moved), Ok(Reply::Moved)]);
        let calls = op.calls();

        let result = dispatcher().apply_with(op, &context).await;

        assert_eq!(result, Ok(Reply::Moved));
        assert_eq!(calls.get(), 3);
        assert!(timer.delays().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_value_is_returned() {
        let context = RetryContext::new().succeed_when(done);
        let op = Scripted::new(vec![Ok(Reply::Gone), Ok(Reply::Done(1))]);
        let calls = op.calls();

        assert_eq!(dispatcher().apply_with(op, &context).await, Ok(Reply::Gone));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_failure_is_returned() {
        let op = Scripted::new(vec![Err::<Reply, _>(ApiError::Invalid), Ok(Reply::Done(1))]);
        let calls = op.calls();

        assert_eq!(dispatcher().apply(op).await, Err(ApiError::Invalid));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_server_driven_delay() {
        let timer = RecordingTimer::default();
        let context = RetryContext::new().timer(timer.clone());
        let policy = When::<u32, ApiError>::new()
            .route(|outcome| match outcome {
                Outcome::Failure(ApiError::Throttled { retry_after_ms }) => Some(Arc::new(
                    Pause::attempts(2, Duration::from_millis(*retry_after_ms)),
                )
                    as Arc<dyn Policy<u32, ApiError>>),
                _ => None,
            })
            .on_failure(|e| *e == ApiError::Reset, Immediate::attempts(2));

        let op = Scripted::new(vec![
            Err(ApiError::Throttled { retry_after_ms: 1500 }),
            Err(ApiError::Throttled { retry_after_ms: 1500 }),
            Ok(11),
        ]);
        assert_eq!(policy.apply_with(op, &context).await, Ok(11));
        assert_eq!(timer.delays(), vec![Duration::from_millis(1500)]);

        let op = Scripted::new(vec![Err(ApiError::Reset), Err(ApiError::Reset), Ok(12)]);
        let calls = op.calls();
        assert_eq!(policy.apply_with(op, &context).await, Ok(12));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_routed() {
        let context = RetryContext::new().fatal_when(|e: &ApiError| *e == ApiError::Reset);
        let policy = When::<u32, ApiError>::new().on_failure(|_| true, Immediate::forever());
        let op = Scripted::new(vec![Err(ApiError::Reset), Ok(1)]);
        let calls = op.calls();

        assert_eq!(policy.apply_with(op, &context).await, Err(ApiError::Reset));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_first_matching_route_wins() {
        let policy = When::<u32, ()>::new()
            .on_value(|n| *n > 10, Immediate::attempts(1))
            .on_value(|n| *n > 0, Immediate::attempts(2));

        assert!(policy.lookup(&Outcome::Value(&20)).is_some());
        assert!(policy.lookup(&Outcome::Value(&5)).is_some());
        assert!(policy.lookup(&Outcome::Value(&0)).is_none());
        assert!(policy.lookup(&Outcome::Failure(&())).is_none());
        assert_eq!(format!("{policy:?}"), "When { route_count: 2 }");
    }
}
