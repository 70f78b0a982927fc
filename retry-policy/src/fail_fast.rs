//! Stop a retry chain early on selected failures.

use crate::context::RetryContext;
use crate::operation::Operation;
use crate::policy::Policy;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Wraps a policy and abandons the chain as soon as an attempt fails with a
/// matching error. The error is returned as-is; everything else is left to
/// the inner policy.
pub struct FailFast<P, E> {
    inner: P,
    fail: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<P: fmt::Debug, E> fmt::Debug for FailFast<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailFast")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<P, E> FailFast<P, E> {
    /// Wrap `inner`, failing fast on errors matching `fail`.
    pub fn new<F>(inner: P, fail: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            fail: Arc::new(fail),
        }
    }

    /// The wrapped policy.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P, T, E> Policy<T, E> for FailFast<P, E>
where
    P: Policy<T, E>,
    T: Send + 'static,
    E: Send + 'static,
{
    async fn retry(
        &self,
        operation: &dyn Operation<T, E>,
        context: &RetryContext<T, E>,
    ) -> Result<T, E> {
        let fail = Arc::clone(&self.fail);
        let context = RetryContext {
            classifier: context.classifier.with_fatal(move |error| fail(error)),
            ..context.clone()
        };
        self.inner.retry(operation, &context).await
    }
}
