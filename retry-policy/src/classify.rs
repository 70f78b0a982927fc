//! Failure classification.
//!
//! Which failures are unrecoverable depends on the caller's error type, so
//! classification is a value supplied through the
//! [`RetryContext`](crate::RetryContext) rather than a fixed list.

use std::fmt;
use std::sync::Arc;

/// How a failed attempt is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The strategy may schedule another attempt.
    Retryable,
    /// The failure ends the whole chain immediately.
    Fatal,
}

/// Sorts failures into retryable and fatal.
pub struct Classifier<E> {
    classify: Arc<dyn Fn(&E) -> FailureClass + Send + Sync>,
}

impl<E> Clone for Classifier<E> {
    fn clone(&self) -> Self {
        Self {
            classify: Arc::clone(&self.classify),
        }
    }
}

impl<E> fmt::Debug for Classifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

impl<E: 'static> Default for Classifier<E> {
    fn default() -> Self {
        Self::retry_all()
    }
}

impl<E: 'static> Classifier<E> {
    /// Create a classifier from a function.
    pub fn new<F>(classify: F) -> Self
    where
        F: Fn(&E) -> FailureClass + Send + Sync + 'static,
    {
        Self {
            classify: Arc::new(classify),
        }
    }

    /// Treat every failure as retryable.
    pub fn retry_all() -> Self {
        Self::new(|_| FailureClass::Retryable)
    }

    /// Treat failures matching `fatal` as fatal, everything else as retryable.
    pub fn fatal_when<F>(fatal: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::new(move |error| {
            if fatal(error) {
                FailureClass::Fatal
            } else {
                FailureClass::Retryable
            }
        })
    }

    /// Classify a failure.
    pub fn classify(&self, error: &E) -> FailureClass {
        (self.classify)(error)
    }

    /// Check if a failure may be retried.
    pub fn is_retryable(&self, error: &E) -> bool {
        self.classify(error) == FailureClass::Retryable
    }

    /// Extend this classifier so failures matching `fatal` are also fatal.
    #[must_use]
    pub fn with_fatal<F>(&self, fatal: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let inner = self.clone();
        Self::new(move |error| {
            if fatal(error) {
                FailureClass::Fatal
            } else {
                inner.classify(error)
            }
        })
    }
}
