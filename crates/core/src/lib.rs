// Taskgate Core - Bounded-Concurrency Task Runner
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{completion_channel, noop_completion, CompletionFn, Queue, QueueOptions};
pub use error::{QueueError, Result};
pub use port::{worker_fn, NoopWorker, Worker};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
