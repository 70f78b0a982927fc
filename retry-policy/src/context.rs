//! Ambient collaborators shared by every attempt of a retry chain.

use crate::classify::Classifier;
use crate::success::Success;
use crate::timer::{Timer, TokioTimer};
use std::fmt;
use std::sync::Arc;

/// Success predicate, failure classifier and timer for one `apply` call.
pub struct RetryContext<T, E> {
    /// Decides whether a settled value is done.
    pub success: Success<T>,
    /// Decides whether a failure may be retried.
    pub classifier: Classifier<E>,
    /// Suspends between attempts of delayed strategies.
    pub timer: Arc<dyn Timer>,
}

impl<T: 'static, E: 'static> Default for RetryContext<T, E> {
    fn default() -> Self {
        Self {
            success: Success::always(),
            classifier: Classifier::retry_all(),
            timer: Arc::new(TokioTimer),
        }
    }
}

impl<T, E> Clone for RetryContext<T, E> {
    fn clone(&self) -> Self {
        Self {
            success: self.success.clone(),
            classifier: self.classifier.clone(),
            timer: Arc::clone(&self.timer),
        }
    }
}

impl<T, E> fmt::Debug for RetryContext<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryContext")
            .field("success", &self.success)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl<T: 'static, E: 'static> RetryContext<T, E> {
    /// Create a context with default collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success predicate.
    #[must_use]
    pub fn success(mut self, success: Success<T>) -> Self {
        self.success = success;
        self
    }

    /// Accept settled values matching `predicate`.
    #[must_use]
    pub fn succeed_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.success(Success::new(predicate))
    }

    /// Set the failure classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: Classifier<E>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Treat failures matching `fatal` as fatal.
    #[must_use]
    pub fn fatal_when<F>(self, fatal: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.classifier(Classifier::fatal_when(fatal))
    }

    /// Set the timer used between attempts.
    #[must_use]
    pub fn timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Arc::new(timer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let context = RetryContext::<u32, String>::new();
        assert!(context.success.evaluate(&0));
        assert!(context.classifier.is_retryable(&"boom".to_string()));
    }

    #[test]
    fn test_context_builder() {
        let context = RetryContext::<u32, String>::new()
            .succeed_when(|n| *n > 3)
            .fatal_when(|e| e == "fatal");

        assert!(!context.success.evaluate(&3));
        assert!(context.success.evaluate(&4));
        assert!(!context.classifier.is_retryable(&"fatal".to_string()));
        assert!(context.classifier.is_retryable(&"transient".to_string()));
    }
}
