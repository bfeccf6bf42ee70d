// Queue Options - typed configuration snapshot

use super::completion::{noop_completion, CompletionFn};
use super::constants::DEFAULT_CONCURRENCY;
use crate::port::{NoopWorker, Worker};
use std::fmt;
use std::sync::Arc;

/// Queue configuration
///
/// Also the snapshot type returned by [`Queue::options`](super::Queue::options):
/// a clone shares the worker/callback handles, but mutating a snapshot never
/// affects the queue it was taken from.
pub struct QueueOptions<T: Send + 'static> {
    /// Max simultaneous worker invocations (must be positive)
    pub concurrency: usize,
    /// Invoked once per item
    pub worker: Arc<dyn Worker<T>>,
    /// Invoked once per drain/abort epoch
    pub on_complete: CompletionFn,
}

impl<T: Send + 'static> QueueOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn worker(mut self, worker: Arc<dyn Worker<T>>) -> Self {
        self.worker = worker;
        self
    }

    pub fn on_complete(mut self, on_complete: CompletionFn) -> Self {
        self.on_complete = on_complete;
        self
    }
}

impl<T: Send + 'static> Default for QueueOptions<T> {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            worker: Arc::new(NoopWorker),
            on_complete: noop_completion(),
        }
    }
}

// Manual impls: derives would demand T: Clone / T: Debug for a phantom reason
impl<T: Send + 'static> Clone for QueueOptions<T> {
    fn clone(&self) -> Self {
        Self {
            concurrency: self.concurrency,
            worker: Arc::clone(&self.worker),
            on_complete: Arc::clone(&self.on_complete),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for QueueOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueOptions")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
