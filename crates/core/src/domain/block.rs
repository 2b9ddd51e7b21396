// Block Domain Model

use serde::{Deserialize, Serialize};

/// Block sequence number (height)
pub type BlockSeq = u64;

/// Block as exposed by the query API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub seq: BlockSeq,
    /// Hex-encoded header hash
    pub hash: String,
    pub prev_hash: String,
    /// Unix timestamp (seconds)
    pub time: i64,
    pub fee: u64,
    /// Hashes of the transactions in the block body
    #[serde(default)]
    pub transactions: Vec<String>,
}
