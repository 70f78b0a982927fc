//! Delay primitive used between attempts.

use futures::future::BoxFuture;
use std::time::Duration;

/// Schedules a continuation after a delay.
///
/// Delayed strategies ask the timer for one signal per retry, each with its
/// own duration. Implementations must not block the calling thread.
pub trait Timer: Send + Sync {
    /// Returns a future that completes once `duration` has elapsed.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Timer backed by the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
