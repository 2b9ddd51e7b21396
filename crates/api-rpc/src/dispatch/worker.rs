// Worker - drains the dispatch queue and runs handlers

use super::panic_guard::{execute_guarded_async, PanicGuardResult};
use super::shutdown::ShutdownToken;
use super::QueueItem;
use crate::error::{ErrorCode, HandlerError, RpcError};
use crate::registry::Registry;
use crate::types::{Request, Response};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use webrpc_core::port::Gateway;

/// Receiving end of the dispatch queue, shared by all workers
pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<QueueItem>>>;

/// Worker executes queued requests against the registry
pub(crate) struct Worker {
    id: usize,
    queue: SharedQueue,
    registry: Arc<Registry>,
    gateway: Arc<dyn Gateway>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        queue: SharedQueue,
        registry: Arc<Registry>,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        Self {
            id,
            queue,
            registry,
            gateway,
        }
    }

    /// Run worker loop until shutdown and the queue is drained
    pub(crate) async fn run(self, mut shutdown: ShutdownToken) {
        info!(worker_id = self.id, "Worker started");
        while let Some(item) = self.next_item(&mut shutdown).await {
            self.process(item).await;
        }
        info!(worker_id = self.id, "Worker stopped");
    }

    /// Dequeue the next item; `None` once shut down and empty
    async fn next_item(&self, shutdown: &mut ShutdownToken) -> Option<QueueItem> {
        let mut rx = self.queue.lock().await;

        if !shutdown.is_shutdown() {
            tokio::select! {
                item = rx.recv() => return item,
                _ = shutdown.wait() => {
                    info!(worker_id = self.id, "Worker draining queue");
                }
            }
        }

        // Refuses new sends, buffered items are still handed out
        rx.close();
        rx.recv().await
    }

    async fn process(&self, item: QueueItem) {
        let QueueItem { request, slot } = item;
        let response = self.execute(request).await;
        slot.complete(response);
    }

    /// Resolve and invoke the handler. Never fails: every outcome is a Response.
    pub(crate) async fn execute(&self, request: Request) -> Response {
        let Request {
            id, method, params, ..
        } = request;

        let Some(handler) = self.registry.lookup(&method).cloned() else {
            warn!(worker_id = self.id, method = %method, "No handler for admitted request");
            return Response::error(Some(id), RpcError::new(ErrorCode::MethodNotFound));
        };

        debug!(worker_id = self.id, id = %id, method = %method, "Executing request");

        let gateway = Arc::clone(&self.gateway);
        // The call itself happens inside the guard so a panic while building
        // the future is caught too
        let outcome = execute_guarded_async(async move { handler(params, gateway).await }).await;

        match outcome {
            PanicGuardResult::Success(Ok(result)) => Response::success(id, result),
            PanicGuardResult::Success(Err(e)) => {
                match &e {
                    HandlerError::InvalidParams(detail) => {
                        debug!(id = %id, method = %method, detail = %detail, "Invalid params");
                    }
                    HandlerError::App(app) => {
                        error!(worker_id = self.id, id = %id, method = %method, error = %app, "Handler failed");
                    }
                }
                Response::error(Some(id), RpcError::from(&e))
            }
            PanicGuardResult::Panicked(msg) => {
                error!(worker_id = self.id, id = %id, method = %method, panic_msg = %msg, "Handler panicked, worker continues");
                Response::error(Some(id), RpcError::new(ErrorCode::InternalError))
            }
        }
    }
}
