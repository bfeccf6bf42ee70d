// Queue - bounded-concurrency dispatch loop

pub mod completion;
pub mod constants;
pub mod options;

#[cfg(test)]
mod queue_test;

pub use completion::{completion_channel, noop_completion, CompletionFn};
pub use options::QueueOptions;

use crate::domain::{CompletionEffect, QueueState};
use crate::port::Worker;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Everything behind the critical-section lock: bookkeeping plus the
/// currently configured worker and completion callback, so a dispatch sees
/// one consistent snapshot of all three.
struct Shared<T: Send + 'static> {
    state: QueueState<T>,
    worker: Arc<dyn Worker<T>>,
    on_complete: CompletionFn,
}

/// Bounded-concurrency task runner.
///
/// Items added via [`Queue::add`] are dispatched FIFO to the configured
/// [`Worker`], with at most `concurrency` invocations in flight. A worker
/// error aborts the queue: it closes, drops pending items, and reports the
/// error to the completion callback exactly once. A closed queue that runs
/// dry fires the callback once with `None` (drain).
///
/// Dispatch is always deferred through [`tokio::spawn`]; the worker never
/// runs inside the call stack of `add`/`open`. All methods must therefore be
/// called within a Tokio runtime.
///
/// `Queue` is a cheap handle: clones share the same underlying queue, and
/// every method takes `&self`, so commands chain:
///
/// ```no_run
/// use taskgate_core::Queue;
///
/// # async fn demo() {
/// let queue: Queue<u32> = Queue::new();
/// queue.set_concurrency(4).add(1).add(2).close();
/// # }
/// ```
pub struct Queue<T: Send + 'static> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T: Send + 'static> Queue<T> {
    /// Create a queue with default options (concurrency 10, no-op worker)
    pub fn new() -> Self {
        Self::with_options(QueueOptions::default())
    }

    pub fn with_options(options: QueueOptions<T>) -> Self {
        let concurrency = if options.concurrency == 0 {
            warn!("concurrency 0 is invalid, using default");
            constants::DEFAULT_CONCURRENCY
        } else {
            options.concurrency
        };
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: QueueState::new(concurrency),
                worker: options.worker,
                on_complete: options.on_complete,
            })),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn concurrency(&self) -> usize {
        self.shared.lock().state.concurrency()
    }

    pub fn worker(&self) -> Arc<dyn Worker<T>> {
        Arc::clone(&self.shared.lock().worker)
    }

    pub fn on_complete(&self) -> CompletionFn {
        Arc::clone(&self.shared.lock().on_complete)
    }

    /// Snapshot of the current configuration. Mutating the snapshot does not
    /// affect the queue; feed it back through [`Queue::set_options`] to apply.
    pub fn options(&self) -> QueueOptions<T> {
        let shared = self.shared.lock();
        QueueOptions {
            concurrency: shared.state.concurrency(),
            worker: Arc::clone(&shared.worker),
            on_complete: Arc::clone(&shared.on_complete),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().state.is_closed()
    }

    // ------------------------------------------------------------------
    // Commands (chainable)
    // ------------------------------------------------------------------

    /// Set the concurrency limit. Zero is ignored, keeping the previous
    /// value. Lowering the limit below the current in-flight count does not
    /// interrupt running workers; the window shrinks as they complete.
    pub fn set_concurrency(&self, concurrency: usize) -> &Self {
        if !self.shared.lock().state.set_concurrency(concurrency) {
            warn!(concurrency, "ignoring invalid concurrency limit");
        }
        self
    }

    /// Replace the worker. Items already handed to the previous worker are
    /// unaffected.
    pub fn set_worker(&self, worker: Arc<dyn Worker<T>>) -> &Self {
        self.shared.lock().worker = worker;
        self
    }

    /// Replace the completion callback for the current and future epochs.
    pub fn set_on_complete(&self, on_complete: CompletionFn) -> &Self {
        self.shared.lock().on_complete = on_complete;
        self
    }

    /// Apply a full options snapshot, each field through its own setter.
    pub fn set_options(&self, options: QueueOptions<T>) -> &Self {
        self.set_concurrency(options.concurrency)
            .set_worker(options.worker)
            .set_on_complete(options.on_complete)
    }

    /// Append an item. Silently dropped when the queue is closed. The
    /// dispatch attempt is scheduled asynchronously; the worker never runs
    /// inside this call.
    pub fn add(&self, item: T) -> &Self {
        {
            let mut shared = self.shared.lock();
            if !shared.state.push(item) {
                debug!("add ignored: queue is closed");
                return self;
            }
            debug!(pending = shared.state.pending_len(), "item queued");
        }
        self.kick();
        self
    }

    /// Discard all pending (not yet dispatched) items. Running workers are
    /// unaffected and the open/closed flag does not change.
    pub fn clear(&self) -> &Self {
        self.shared.lock().state.clear();
        self
    }

    /// Refuse further `add` calls. If nothing is pending or running, the
    /// completion callback fires synchronously with `None`.
    pub fn close(&self) -> &Self {
        let drained = {
            let mut shared = self.shared.lock();
            if shared.state.close() {
                Some(Arc::clone(&shared.on_complete))
            } else {
                None
            }
        };
        if let Some(on_complete) = drained {
            debug!("queue closed while idle, draining immediately");
            on_complete(None);
        }
        self
    }

    /// Re-enable `add`, start a fresh completion epoch, and schedule a
    /// dispatch attempt for anything still pending.
    pub fn open(&self) -> &Self {
        self.shared.lock().state.reopen();
        self.kick();
        self
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Schedule one asynchronous dispatch attempt. Attempts are idempotent:
    /// each re-checks the gate under the lock, so redundant kicks are
    /// harmless no-ops.
    fn kick(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(Self::drive(shared));
    }

    /// One dispatch lane: pull the head item if the window has room, run the
    /// worker, then keep pulling as long as each completion frees capacity.
    /// Up to `concurrency` lanes run simultaneously, one per kicked attempt
    /// that passed the admission gate.
    async fn drive(shared: Arc<Mutex<Shared<T>>>) {
        loop {
            let (item, worker) = {
                let mut guard = shared.lock();
                match guard.state.take_next() {
                    Some(item) => (item, Arc::clone(&guard.worker)),
                    None => return,
                }
            };

            let result = worker.process(item).await;

            // Lock is re-acquired after the await; never held across it.
            let settle = {
                let mut guard = shared.lock();
                match result {
                    Ok(()) => match guard.state.finish_ok() {
                        CompletionEffect::DispatchNext => None,
                        CompletionEffect::Drained => {
                            Some((Arc::clone(&guard.on_complete), None))
                        }
                        CompletionEffect::Ignored => return,
                    },
                    Err(err) => {
                        if guard.state.finish_err() {
                            Some((Arc::clone(&guard.on_complete), Some(err)))
                        } else {
                            // Another lane already settled the epoch
                            return;
                        }
                    }
                }
            };

            match settle {
                None => continue,
                Some((on_complete, outcome)) => {
                    match &outcome {
                        None => debug!("queue drained"),
                        Some(err) => error!(%err, "worker failed, aborting queue"),
                    }
                    on_complete(outcome);
                    return;
                }
            }
        }
    }
}

impl<T: Send + 'static> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
