// Port Layer - Interfaces for caller-supplied dependencies

pub mod worker;

// Re-exports
pub use worker::{worker_fn, NoopWorker, Worker};
