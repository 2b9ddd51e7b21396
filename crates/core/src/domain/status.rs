// Node Status Domain Model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Node status returned by `get_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainStatus {
    pub running: bool,
    pub num_of_blocks: u64,
    pub hash_of_last_block: String,
    pub time_since_last_block: String,
}

impl BlockchainStatus {
    pub fn new(num_of_blocks: u64, hash_of_last_block: impl Into<String>, since: Duration) -> Self {
        Self {
            running: true,
            num_of_blocks,
            hash_of_last_block: hash_of_last_block.into(),
            time_since_last_block: format_elapsed(since),
        }
    }
}

/// Render an elapsed duration the way operators read it: `1h2m3s`, `45s`
pub fn format_elapsed(d: Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    match (h, m) {
        (0, 0) => format!("{}s", s),
        (0, _) => format!("{}m{}s", m, s),
        _ => format!("{}h{}m{}s", h, m, s),
    }
}
