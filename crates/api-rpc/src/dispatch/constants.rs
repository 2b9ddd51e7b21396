// Dispatch constants (No magic values)
use std::time::Duration;

/// Default dispatch queue capacity
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Default number of workers draining the queue
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Upper bound the host waits for workers to drain after shutdown (5 seconds)
pub const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
