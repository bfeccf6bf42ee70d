// Central Error Type for the Queue

use thiserror::Error;

/// Queue-level error type
///
/// There is exactly one failure kind: a worker reporting that an item could
/// not be processed. Queue methods themselves never fail; invalid inputs to
/// setters are swallowed, not raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Worker failed: {0}")]
    WorkerFailed(String),
}

impl QueueError {
    /// Convenience constructor for worker implementations
    pub fn worker(msg: impl Into<String>) -> Self {
        QueueError::WorkerFailed(msg.into())
    }
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;
