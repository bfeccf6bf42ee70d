// Worker Port
// Abstraction for processing a single opaque item

use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Worker trait
///
/// One call per item; the item is opaque to the queue. Returning an error
/// aborts the whole queue (no retries at this level).
///
/// Implementations:
/// - closures via [`worker_fn`]
/// - [`NoopWorker`]: the default when none is configured
#[async_trait]
pub trait Worker<T: Send + 'static>: Send + Sync {
    /// Process one item to completion
    ///
    /// # Errors
    /// - `QueueError::WorkerFailed` when the item cannot be processed;
    ///   this is fatal to the queue's current epoch
    async fn process(&self, item: T) -> Result<()>;
}

/// Default worker: accepts and discards every item
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWorker;

#[async_trait]
impl<T: Send + 'static> Worker<T> for NoopWorker {
    async fn process(&self, _item: T) -> Result<()> {
        Ok(())
    }
}

struct FnWorker<F> {
    f: F,
}

#[async_trait]
impl<T, F, Fut> Worker<T> for FnWorker<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn process(&self, item: T) -> Result<()> {
        (self.f)(item).await
    }
}

/// Wrap an async closure into a shareable worker handle
pub fn worker_fn<T, F, Fut>(f: F) -> Arc<dyn Worker<T>>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnWorker { f })
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::QueueError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock worker behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Sleep for the given duration, then succeed
        Delay(Duration),
        /// Fail with message
        Fail(String),
        /// Fail with message, but only for items matching the given value
        FailOn(String, String),
    }

    /// Mock worker for testing: scripted behavior plus call recording
    pub struct MockWorker {
        behavior: MockBehavior,
        processed: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl MockWorker {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                processed: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_delay(delay: Duration) -> Self {
            Self::new(MockBehavior::Delay(delay))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        /// Fail only when processing `item`, succeed otherwise
        pub fn new_fail_on(item: impl Into<String>, message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailOn(item.into(), message.into()))
        }

        /// Items processed so far, in dispatch order
        pub fn processed(&self) -> Vec<String> {
            self.processed.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.processed.lock().unwrap().len()
        }

        /// Number of calls currently inside `process`
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        /// Highest number of simultaneous `process` calls observed
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        fn enter(&self, item: &str) {
            self.processed.lock().unwrap().push(item.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        }

        fn exit(&self) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Worker<String> for MockWorker {
        async fn process(&self, item: String) -> Result<()> {
            self.enter(&item);

            let result = match &self.behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Delay(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(())
                }
                MockBehavior::Fail(msg) => Err(QueueError::worker(msg.clone())),
                MockBehavior::FailOn(target, msg) => {
                    if &item == target {
                        Err(QueueError::worker(msg.clone()))
                    } else {
                        Ok(())
                    }
                }
            };

            self.exit();
            result
        }
    }
}
