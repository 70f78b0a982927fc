//! Success predicates.
//!
//! A [`Success`] decides whether a settled value is "done". Policies stop
//! retrying at the first accepted value; a rejected value drives the same
//! retry path as a retryable failure.

use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a settled value ends the retry chain.
pub struct Success<T> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Clone for Success<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Success<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Success").finish_non_exhaustive()
    }
}

impl<T: 'static> Default for Success<T> {
    fn default() -> Self {
        Self::always()
    }
}

impl<T: 'static> Success<T> {
    /// Create a predicate from a function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Accept every settled value, so only failures are retried.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Reject every settled value.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Accept values equal to `expected`.
    pub fn equals(expected: T) -> Self
    where
        T: PartialEq + Send + Sync,
    {
        Self::new(move |value| *value == expected)
    }

    /// Evaluate the predicate against a settled value.
    pub fn evaluate(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Accept a value when this predicate does, or unconditionally when
    /// `forced` is set.
    #[must_use]
    pub fn or(&self, forced: bool) -> Self {
        if forced {
            return Self::always();
        }
        self.clone()
    }

    /// Accept a value when either predicate does.
    #[must_use]
    pub fn or_else(&self, other: &Success<T>) -> Self {
        let (left, right) = (self.clone(), other.clone());
        Self::new(move |value| left.evaluate(value) || right.evaluate(value))
    }

    /// Accept a value only when both predicates do.
    #[must_use]
    pub fn and(&self, other: &Success<T>) -> Self {
        let (left, right) = (self.clone(), other.clone());
        Self::new(move |value| left.evaluate(value) && right.evaluate(value))
    }
}

impl<T: 'static> Success<Option<T>> {
    /// Accept `Some(_)` values.
    pub fn some() -> Self {
        Self::new(Option::is_some)
    }
}

impl<T: 'static, E: 'static> Success<Result<T, E>> {
    /// Accept `Ok(_)` values.
    pub fn ok() -> Self {
        Self::new(Result::is_ok)
    }
}
