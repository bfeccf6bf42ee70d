// Application Layer - Orchestration on top of the domain state machine

pub mod queue;

// Re-exports
pub use queue::{completion_channel, noop_completion, CompletionFn, Queue, QueueOptions};
