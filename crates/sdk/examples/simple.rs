//! Simple SDK Example
//!
//! Demonstrates basic usage of the webrpc SDK.
//!
//! # Usage
//!
//! 1. Start the node:
//!    ```bash
//!    cargo run --package webrpc-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple -- <address>
//!    ```

use webrpc_sdk::NodeClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("WebRPC SDK - Simple Example");
    println!("===========================\n");

    // 1. Connect to node
    println!("1. Connecting to node...");
    let client = NodeClient::connect("http://127.0.0.1:6422").await?;
    println!("   ✓ Connected\n");

    // 2. Status
    println!("2. Fetching status...");
    let status = client.status().await?;
    println!("   ✓ Blocks: {}", status.num_of_blocks);
    println!("   ✓ Head: {}", status.hash_of_last_block);
    println!("   ✓ Since last block: {}\n", status.time_since_last_block);

    // 3. Recent blocks
    println!("3. Fetching last 5 blocks...");
    for block in client.last_blocks(5).await? {
        println!("   #{:<8} {} ({} txs)", block.seq, block.hash, block.transactions.len());
    }
    println!();

    // 4. Outputs for an address given on the command line
    if let Some(address) = std::env::args().nth(1) {
        println!("4. Fetching unspent outputs for {}...", address);
        let outputs = client.outputs(&[address]).await?;
        let total: u64 = outputs.iter().map(|o| o.coins).sum();
        println!("   ✓ {} outputs, {} coins", outputs.len(), total);
    }

    Ok(())
}
