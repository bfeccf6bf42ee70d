// Domain Layer - Pure bookkeeping, no async, no I/O

pub mod queue;

// Re-exports
pub use queue::{CompletionEffect, QueueState};
