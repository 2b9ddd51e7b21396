// Dispatch Engine - bounded queue, worker pool, completion slots, shutdown

mod completion;
pub mod constants;
mod panic_guard;
mod shutdown;
mod worker;

use constants::*;
use worker::Worker;
pub use completion::{completion_slot, CompletionSlot, CompletionWaiter};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::error::{DispatchError, RpcError};
use crate::registry::Registry;
use crate::types::{Request, Response};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};
use webrpc_core::port::Gateway;

/// Queue capacity and worker count, fixed at start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub queue_size: usize,
    pub worker_count: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.queue_size == 0 {
            return Err(DispatchError::InvalidConfig(
                "queue size must be at least 1".to_string(),
            ));
        }
        if self.worker_count == 0 {
            return Err(DispatchError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Admitted request waiting for a worker
#[derive(Debug)]
pub struct QueueItem {
    pub request: Request,
    pub slot: CompletionSlot,
}

/// Producer handle: admission control in front of the queue
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::Sender<QueueItem>,
    shutdown: ShutdownToken,
    capacity: usize,
}

/// The running workers
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl Dispatcher {
    /// Create the queue and spawn `worker_count` workers on it
    pub fn start(
        config: DispatchConfig,
        registry: Arc<Registry>,
        gateway: Arc<dyn Gateway>,
        shutdown: ShutdownToken,
    ) -> Result<(Dispatcher, WorkerPool), DispatchError> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel(config.queue_size);
        let queue = Arc::new(Mutex::new(receiver));

        let mut workers = JoinSet::new();
        for id in 0..config.worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&queue),
                Arc::clone(&registry),
                Arc::clone(&gateway),
            );
            workers.spawn(worker.run(shutdown.clone()));
        }

        info!(
            queue_size = config.queue_size,
            worker_count = config.worker_count,
            "Dispatcher started"
        );

        Ok((
            Dispatcher {
                sender,
                shutdown,
                capacity: config.queue_size,
            },
            WorkerPool { workers },
        ))
    }

    /// Admit a request without blocking
    ///
    /// # Errors
    /// - DispatchError::ShuttingDown after the shutdown signal
    /// - DispatchError::Overloaded if the queue is at capacity
    pub fn try_submit(&self, request: Request) -> Result<CompletionWaiter, DispatchError> {
        if self.shutdown.is_shutdown() {
            return Err(DispatchError::ShuttingDown);
        }

        let (slot, waiter) = completion_slot(request.id.clone());
        match self.sender.try_send(QueueItem { request, slot }) {
            Ok(()) => Ok(waiter),
            Err(TrySendError::Full(item)) => {
                warn!(
                    id = %item.request.id,
                    method = %item.request.method,
                    capacity = self.capacity,
                    "Dispatch queue full, rejecting request"
                );
                Err(DispatchError::Overloaded {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Closed(_)) => Err(DispatchError::ShuttingDown),
        }
    }

    /// Admit a request and wait for its response
    ///
    /// Admission failures are turned into error responses carrying the
    /// request id, so callers always get a well-formed Response.
    pub async fn submit(&self, request: Request) -> Response {
        let id = request.id.clone();
        match self.try_submit(request) {
            Ok(waiter) => waiter.wait().await,
            Err(e) => Response::error(Some(id), RpcError::from(&e)),
        }
    }

    /// Items currently buffered in the queue
    pub fn queue_len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

impl WorkerPool {
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker to drain the queue and exit
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }
        info!("All workers stopped");
    }
}
