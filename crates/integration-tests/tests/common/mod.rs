//! Shared harness: boots the real HTTP server on an ephemeral port

#![allow(dead_code)]

use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use webrpc_api_rpc::{
    node_registry, shutdown_channel, DispatchConfig, RpcServer, RpcServerConfig, ServerError,
    ShutdownSender,
};
use webrpc_core::domain::{Address, Block, Network, UnspentOutput};
use webrpc_core::port::time_provider::FixedTimeProvider;
use webrpc_core::port::Gateway;
use webrpc_infra_sqlite::{create_pool, run_migrations, SqliteChainIndex};

pub const GENESIS_TIME: i64 = 1_500_000_000;
/// Ten blocks, ten seconds apart; "now" is 42s after the head
pub const NUM_BLOCKS: u64 = 10;
pub const NOW: i64 = GENESIS_TIME + 90 + 42;

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: ShutdownSender,
    pub handle: JoinHandle<Result<(), ServerError>>,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start(gateway: Arc<dyn Gateway>, dispatch: DispatchConfig) -> Self {
        let config = RpcServerConfig {
            port: 0,
            dispatch,
            ..Default::default()
        };
        let registry = Arc::new(node_registry(Network::Test).unwrap());
        let (shutdown, token) = shutdown_channel();

        let running = RpcServer::new(config, registry, gateway)
            .bind(token)
            .await
            .unwrap();
        let addr = running.local_addr();

        Self {
            addr,
            shutdown,
            handle: running.spawn(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// POST a raw body and decode the JSON-RPC response
    pub async fn post_raw(&self, body: impl Into<String>) -> Value {
        self.client
            .post(self.url())
            .header("content-type", "application/json")
            .body(body.into())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn call(&self, id: &str, method: &str, params: Value) -> Value {
        let body = serde_json::json!({
            "id": id,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.post_raw(body.to_string()).await
    }

    pub async fn stop(self) {
        self.shutdown.shutdown();
        self.handle.await.unwrap().unwrap();
    }
}

pub fn address(byte: u8) -> Address {
    Address::from_key_hash([byte; 20], Network::Test)
}

pub fn block(seq: u64) -> Block {
    Block {
        seq,
        hash: format!("{:064x}", seq + 1),
        prev_hash: if seq == 0 {
            String::new()
        } else {
            format!("{:064x}", seq)
        },
        time: GENESIS_TIME + seq as i64 * 10,
        fee: seq,
        transactions: vec![format!("tx{}", seq)],
    }
}

/// SQLite chain index with NUM_BLOCKS blocks and three unspent outputs
/// (two owned by `address(1)`, one by `address(2)`)
pub async fn seeded_index() -> Arc<SqliteChainIndex> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let index = SqliteChainIndex::new(pool, Arc::new(FixedTimeProvider(NOW)));

    for seq in 0..NUM_BLOCKS {
        index.insert_block(&block(seq)).await.unwrap();
    }

    let outputs = [("out-a", 1, 2, 5_000_000), ("out-b", 2, 3, 1_000_000), ("out-c", 1, 7, 250)];
    for (hash, owner, block_seq, coins) in outputs {
        index
            .insert_output(&UnspentOutput {
                hash: hash.to_string(),
                src_tx: format!("tx{}", block_seq),
                address: address(owner),
                coins,
                hours: 1,
                block_seq,
            })
            .await
            .unwrap();
    }

    Arc::new(index)
}
