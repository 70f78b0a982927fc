//! The policy abstraction.

use crate::context::RetryContext;
use crate::operation::Operation;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;

/// A settled attempt, as seen by routing decisions.
#[derive(Debug)]
pub enum Outcome<'a, T, E> {
    /// The attempt produced a value.
    Value(&'a T),
    /// The attempt failed.
    Failure(&'a E),
}

/// Strategy deciding whether, when and how often to retry an operation.
///
/// Implementations call [`Operation::attempt`] once per attempt, never start
/// an attempt before the previous one settled, and hand back either the first
/// value accepted by the context's success predicate, a fatal failure, or
/// whatever their own termination rule settles on.
#[async_trait]
pub trait Policy<T, E>: Send + Sync {
    /// Run `operation` under this policy.
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E>;
}

/// Entry points available on every [`Policy`].
pub trait PolicyExt<T, E>: Policy<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Retry `operation` with the default context: every settled value is
    /// accepted and every failure is retryable.
    fn apply<'a, O>(&'a self, operation: O) -> BoxFuture<'a, Result<T, E>>
    where
        O: Operation<T, E> + 'a,
    {
        Box::pin(async move {
            let context = RetryContext::default();
            self.retry(&operation, &context).await
        })
    }

    /// Retry `operation` with an explicit context.
    fn apply_with<'a, O>(
        &'a self,
        operation: O,
        context: &'a RetryContext<T, E>,
    ) -> BoxFuture<'a, Result<T, E>>
    where
        O: Operation<T, E> + 'a,
    {
        Box::pin(async move { self.retry(&operation, context).await })
    }

    /// Retry an already-built future by cloning it for every attempt.
    ///
    /// Each clone must start a fresh execution. A memoizing future such as
    /// `futures::future::Shared` replays its first outcome on every attempt.
    fn apply_future<'a, Fut>(&'a self, future: Fut) -> BoxFuture<'a, Result<T, E>>
    where
        Fut: Future<Output = Result<T, E>> + Clone + Send + Sync + 'static,
    {
        self.apply(move || future.clone())
    }
}

impl<P, T, E> PolicyExt<T, E> for P
where
    P: Policy<T, E> + ?Sized,
    T: Send + 'static,
    E: Send + 'static,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Scripted;
    use std::sync::Arc;

    /// Runs a single attempt and never retries.
    struct Once;

    #[async_trait]
    impl<T, E> Policy<T, E> for Once
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        async fn retry(
            &self,
            operation: &dyn Operation<T, E>,
            _context: &RetryContext<T, E>,
        ) -> Result<T, E> {
            operation.attempt().await
        }
    }

    #[tokio::test]
    async fn test_custom_policy_apply() {
        let op = Scripted::new(vec![Err::<u32, _>("down"), Ok(1)]);
        let calls = op.calls();

        assert_eq!(Once.apply(op).await, Err("down"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_apply_with_context() {
        let context = RetryContext::new().succeed_when(|n: &u32| *n > 0);
        let result = Once.apply_with(|| async { Ok::<u32, ()>(0) }, &context).await;
        assert_eq!(result, Ok(0));
    }

    #[tokio::test]
    async fn test_policy_as_trait_object() {
        let policy: Arc<dyn Policy<&str, ()>> = Arc::new(Once);
        assert_eq!(policy.apply(|| async { Ok("done") }).await, Ok("done"));
    }

    #[tokio::test]
    async fn test_apply_future() {
        let result = Once
            .apply_future(futures::future::ready(Ok::<_, ()>(7)))
            .await;
        assert_eq!(result, Ok(7));
    }
}
