//! Test doubles for operations and timers.

use crate::operation::{AttemptFuture, Operation};
use crate::timer::Timer;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub(crate) struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Operation that plays back a fixed list of outcomes, repeating the last one
/// once the list runs out.
pub(crate) struct Scripted<T, E> {
    outcomes: Vec<Result<T, E>>,
    calls: Calls,
}

impl<T, E> Scripted<T, E> {
    pub(crate) fn new(outcomes: Vec<Result<T, E>>) -> Self {
        assert!(!outcomes.is_empty(), "script needs at least one outcome");
        Self {
            outcomes,
            calls: Calls::default(),
        }
    }

    pub(crate) fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

impl<T, E> Operation<T, E> for Scripted<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn attempt(&self) -> AttemptFuture<T, E> {
        let n = self.calls.bump();
        let index = n.min(self.outcomes.len() - 1);
        let outcome = self.outcomes[index].clone();
        Box::pin(async move { outcome })
    }
}

/// Timer that records requested delays and completes immediately.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTimer {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingTimer {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Timer for RecordingTimer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
