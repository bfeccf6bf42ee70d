// Completion Callback Channel

use crate::error::QueueError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Completion callback: invoked exactly once per drain/abort epoch.
///
/// `None` signals a normal drain; `Some(err)` carries the worker failure
/// that aborted the queue.
pub type CompletionFn = Arc<dyn Fn(Option<QueueError>) + Send + Sync>;

/// Completion callback that does nothing
pub fn noop_completion() -> CompletionFn {
    Arc::new(|_| {})
}

/// Create a completion callback paired with a receiver.
///
/// Lets callers await drain/abort as a typed channel instead of reacting
/// inside the callback. One message arrives per completed epoch.
pub fn completion_channel() -> (CompletionFn, mpsc::UnboundedReceiver<Option<QueueError>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: CompletionFn = Arc::new(move |outcome| {
        let _ = tx.send(outcome);
    });
    (callback, rx)
}
