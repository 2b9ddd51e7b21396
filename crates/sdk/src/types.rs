//! SDK Response Types
//!
//! Mirrors the JSON-RPC result types from the api-rpc crate. Addresses stay
//! base58 strings here so the SDK does not pull in the address codec.

use serde::{Deserialize, Serialize};

/// Result of `get_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainStatus {
    pub running: bool,
    pub num_of_blocks: u64,
    pub hash_of_last_block: String,
    pub time_since_last_block: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub seq: u64,
    pub hash: String,
    pub prev_hash: String,
    pub time: i64,
    pub fee: u64,
    #[serde(default)]
    pub transactions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub hash: String,
    pub src_tx: String,
    pub address: String,
    pub coins: u64,
    pub hours: u64,
    pub block_seq: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlocksResult {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputsResult {
    pub outputs: Vec<UnspentOutput>,
}
