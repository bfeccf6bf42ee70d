// Shared test setup

use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber once per test binary; repeat calls are no-ops.
/// Run with RUST_LOG=debug to see queue dispatch logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
