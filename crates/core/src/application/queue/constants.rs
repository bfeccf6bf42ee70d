// Queue constants (no magic values)

/// Default concurrency limit when none is configured
pub const DEFAULT_CONCURRENCY: usize = 10;
