// Unspent Output Domain Model

use super::{Address, BlockSeq};
use serde::{Deserialize, Serialize};

/// Unspent transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub hash: String,
    /// Transaction that created this output
    pub src_tx: String,
    pub address: Address,
    /// Coin amount in droplets
    pub coins: u64,
    pub hours: u64,
    pub block_seq: BlockSeq,
}
