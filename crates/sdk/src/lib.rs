//! WebRPC SDK - Rust Client Library
//!
//! Typed client for a node's read-only JSON-RPC query API.
//!
//! # Example
//!
//! ```no_run
//! use webrpc_sdk::NodeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NodeClient::connect("http://127.0.0.1:6422").await?;
//!
//!     let status = client.status().await?;
//!     println!("{} blocks, head {}", status.num_of_blocks, status.hash_of_last_block);
//!
//!     for block in client.last_blocks(5).await? {
//!         println!("#{} {}", block.seq, block.hash);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::NodeClient;
pub use error::{Result, SdkError};
pub use types::{Block, BlockchainStatus, UnspentOutput};
