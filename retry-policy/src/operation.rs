//! Operations that a policy retries.

use futures::future::BoxFuture;
use std::future::Future;

/// A single in-flight attempt of an operation.
pub type AttemptFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// Zero-argument producer of fresh attempts.
///
/// A policy holds on to the producer, never to a started attempt: every call
/// to [`Operation::attempt`] must begin a new execution. Policies call it
/// exactly once per attempt and never start an attempt before the previous
/// one has settled.
///
/// Any `Fn() -> impl Future<Output = Result<T, E>>` closure is an operation.
pub trait Operation<T, E>: Send + Sync {
    /// Start a new attempt.
    fn attempt(&self) -> AttemptFuture<T, E>;
}

impl<F, Fut, T, E> Operation<T, E> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn attempt(&self) -> AttemptFuture<T, E> {
        Box::pin(self())
    }
}
