// Response Correlator
//
// One slot per admitted request. The worker consumes the slot when it
// writes the response, so a slot can be written at most once.

use crate::error::{ErrorCode, RpcError};
use crate::types::Response;
use tokio::sync::oneshot;
use tracing::debug;

/// Worker side of the completion slot
#[derive(Debug)]
pub struct CompletionSlot {
    id: String,
    tx: oneshot::Sender<Response>,
}

/// Caller side of the completion slot
#[derive(Debug)]
pub struct CompletionWaiter {
    id: String,
    rx: oneshot::Receiver<Response>,
}

pub fn completion_slot(id: impl Into<String>) -> (CompletionSlot, CompletionWaiter) {
    let id = id.into();
    let (tx, rx) = oneshot::channel();
    (
        CompletionSlot { id: id.clone(), tx },
        CompletionWaiter { id, rx },
    )
}

impl CompletionSlot {
    pub fn complete(self, response: Response) {
        if self.tx.send(response).is_err() {
            debug!(id = %self.id, "Caller went away before response was ready");
        }
    }
}

impl CompletionWaiter {
    /// Wait until a worker fills the slot
    ///
    /// A slot dropped unwritten (forced teardown) yields an Internal error.
    pub async fn wait(self) -> Response {
        match self.rx.await {
            Ok(response) => response,
            Err(_) => Response::error(Some(self.id), RpcError::new(ErrorCode::InternalError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_waiter_receives_completed_response() {
        let (slot, waiter) = completion_slot("1");
        slot.complete(Response::success("1", json!("ok")));

        let resp = waiter.wait().await;
        assert_eq!(resp.result(), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn test_dropped_slot_yields_internal_error() {
        let (slot, waiter) = completion_slot("2");
        drop(slot);

        let resp = waiter.wait().await;
        assert_eq!(resp.id.as_deref(), Some("2"));
        assert_eq!(resp.rpc_error().unwrap().code, ErrorCode::InternalError.code());
    }

    #[tokio::test]
    async fn test_complete_after_caller_gone_does_not_panic() {
        let (slot, waiter) = completion_slot("3");
        drop(waiter);
        slot.complete(Response::success("3", json!(null)));
    }
}
