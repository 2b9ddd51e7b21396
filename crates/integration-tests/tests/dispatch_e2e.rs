//! Backpressure, fault isolation and shutdown drain over real HTTP

mod common;

use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use webrpc_api_rpc::DispatchConfig;
use webrpc_core::port::gateway::mocks::{MockBehavior, MockGateway};
use webrpc_core::port::Gateway;

fn spawn_call(server: &TestServer, id: &str) -> JoinHandle<Value> {
    let url = server.url();
    let body = json!({"id": id, "jsonrpc": "2.0", "method": "get_status"}).to_string();
    tokio::spawn(async move {
        reqwest::Client::new()
            .post(url)
            .body(body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    })
}

async fn wait_for_calls(mock: &MockGateway, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while mock.call_count() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("gateway was never called");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_queue_answers_server_busy() {
    let mock = Arc::new(MockGateway::new_gated());
    let gateway: Arc<dyn Gateway> = mock.clone();
    let server = TestServer::start(
        gateway,
        DispatchConfig {
            queue_size: 2,
            worker_count: 1,
        },
    )
    .await;

    // One in the worker, two buffered
    let busy = spawn_call(&server, "w");
    wait_for_calls(&mock, 1).await;
    let queued = [spawn_call(&server, "q1"), spawn_call(&server, "q2")];
    tokio::time::sleep(Duration::from_millis(300)).await;

    let started = std::time::Instant::now();
    let rejected = server.call("over", "get_status", json!({})).await;
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(rejected["id"], "over");
    assert_eq!(rejected["error"]["code"], -32000);
    assert_eq!(rejected["error"]["message"], "Server busy");

    mock.release(3);
    assert_eq!(busy.await.unwrap()["id"], "w");
    for (handle, id) in queued.into_iter().zip(["q1", "q2"]) {
        let resp = handle.await.unwrap();
        assert_eq!(resp["id"], id);
        assert!(resp.get("result").is_some());
    }

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_correlated() {
    const WORKERS: usize = 3;
    const QUEUE: usize = 16;

    let mock = Arc::new(MockGateway::new_gated());
    let gateway: Arc<dyn Gateway> = mock.clone();
    let server = TestServer::start(
        gateway,
        DispatchConfig {
            queue_size: QUEUE,
            worker_count: WORKERS,
        },
    )
    .await;

    let ids: Vec<String> = (0..WORKERS + QUEUE).map(|i| format!("req-{}", i)).collect();
    let mut handles = Vec::new();
    for id in &ids[..WORKERS] {
        handles.push(spawn_call(&server, id));
    }
    wait_for_calls(&mock, WORKERS).await;
    for id in &ids[WORKERS..] {
        handles.push(spawn_call(&server, id));
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    mock.release(ids.len());
    for (handle, id) in handles.into_iter().zip(&ids) {
        let resp = handle.await.unwrap();
        assert_eq!(resp["id"], json!(id));
        assert_eq!(resp["result"]["running"], true, "request {} failed: {}", id, resp);
    }
    assert_eq!(mock.call_count(), ids.len());

    server.stop().await;
}

#[tokio::test]
async fn test_panicking_handler_does_not_kill_worker() {
    let mock = Arc::new(MockGateway::new_panic_inducing("index corrupted"));
    let gateway: Arc<dyn Gateway> = mock.clone();
    let server = TestServer::start(
        gateway,
        DispatchConfig {
            queue_size: 4,
            worker_count: 1,
        },
    )
    .await;

    let resp = server.call("boom", "get_status", json!({})).await;
    assert_eq!(
        resp,
        json!({
            "id": "boom",
            "jsonrpc": "2.0",
            "error": {"code": -32603, "message": "Internal error"}
        })
    );

    // Same single worker serves the next request
    mock.set_behavior(MockBehavior::Success);
    let resp = server.call("after", "get_status", json!({})).await;
    assert_eq!(resp["id"], "after");
    assert!(resp.get("result").is_some());

    server.stop().await;
}

#[tokio::test]
async fn test_gateway_failure_hides_detail() {
    let gateway: Arc<dyn Gateway> = Arc::new(MockGateway::new_fail("disk on fire"));
    let server = TestServer::start(gateway, DispatchConfig::default()).await;

    let resp = server.call("f", "get_status", json!({})).await;
    assert_eq!(resp["error"]["code"], -32603);
    assert!(resp["error"].get("data").is_none());

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_drains_admitted_requests() {
    let mock = Arc::new(MockGateway::new_gated());
    let gateway: Arc<dyn Gateway> = mock.clone();
    let server = TestServer::start(
        gateway,
        DispatchConfig {
            queue_size: 4,
            worker_count: 1,
        },
    )
    .await;

    let in_flight = spawn_call(&server, "in-flight");
    wait_for_calls(&mock, 1).await;
    let queued = spawn_call(&server, "queued");
    tokio::time::sleep(Duration::from_millis(300)).await;

    let TestServer {
        addr,
        shutdown,
        handle,
        ..
    } = server;
    shutdown.shutdown();

    // New connections are refused once the listener has closed
    tokio::time::sleep(Duration::from_millis(100)).await;
    let refused = reqwest::Client::new()
        .post(format!("http://{}", addr))
        .body(r#"{"id":"late","jsonrpc":"2.0","method":"get_status"}"#)
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(refused.is_err());

    mock.release(2);
    assert!(in_flight.await.unwrap().get("result").is_some());
    let drained = queued.await.unwrap();
    assert_eq!(drained["id"], "queued");
    assert!(drained.get("result").is_some());

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
