//! WebRPC CLI - Command-line interface for a node's query API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:6422";

#[derive(Parser)]
#[command(name = "webrpc")]
#[command(about = "Query a node over JSON-RPC", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WEBRPC_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Print the raw JSON result instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node status
    Status,

    /// Show the most recent blocks
    LastBlocks {
        /// Number of blocks
        #[arg(short = 'n', long, default_value = "10")]
        num: u64,
    },

    /// Show blocks in an inclusive seq range
    Blocks {
        start: u64,
        end: u64,
    },

    /// Show unspent outputs owned by the given addresses
    Outputs {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

impl Commands {
    fn method(&self) -> &'static str {
        match self {
            Commands::Status => "get_status",
            Commands::LastBlocks { .. } => "get_lastblocks",
            Commands::Blocks { .. } => "get_blocks",
            Commands::Outputs { .. } => "get_outputs",
        }
    }

    /// Params are string-valued on the wire
    fn params(&self) -> HashMap<&'static str, String> {
        match self {
            Commands::Status => HashMap::new(),
            Commands::LastBlocks { num } => HashMap::from([("num", num.to_string())]),
            Commands::Blocks { start, end } => {
                HashMap::from([("start", start.to_string()), ("end", end.to_string())])
            }
            Commands::Outputs { addresses } => {
                HashMap::from([("addresses", addresses.join(","))])
            }
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: HashMap<&'static str, String>,
    id: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<String>,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<String>,
}

#[derive(Deserialize, Tabled)]
struct BlockRow {
    seq: u64,
    hash: String,
    time: i64,
    fee: u64,
    #[tabled(display_with = "display_len")]
    transactions: Vec<String>,
}

fn display_len(v: &[String]) -> String {
    v.len().to_string()
}

#[derive(Deserialize, Tabled)]
struct OutputRow {
    hash: String,
    address: String,
    coins: u64,
    hours: u64,
    block_seq: u64,
}

#[derive(Deserialize)]
struct Blocks {
    blocks: Vec<BlockRow>,
}

#[derive(Deserialize)]
struct Outputs {
    outputs: Vec<OutputRow>,
}

fn build_request(command: &Commands) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: command.method().to_string(),
        params: command.params(),
        id: uuid::Uuid::new_v4().to_string(),
    }
}

async fn call_rpc(url: &str, request: &JsonRpcRequest) -> Result<Value> {
    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(request)
        .send()
        .await
        .context("Failed to connect to node")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data {
            Some(data) => anyhow::bail!("RPC error ({}): {}: {}", error.code, error.message, data),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    if response.id.as_deref() != Some(request.id.as_str()) {
        anyhow::bail!("Response id does not match request id {}", request.id);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let request = build_request(&cli.command);
    let result = call_rpc(&cli.rpc_url, &request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match cli.command {
        Commands::Status => {
            println!("{}", "Node Status".cyan().bold());
            println!();
            println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
            let running = result["running"].as_bool().unwrap_or(false);
            let state = if running { "RUNNING".green() } else { "STOPPED".red() };
            println!("  {} {}", "Status:".bold(), state);
            println!("  {} {}", "Blocks:".bold(), result["num_of_blocks"]);
            println!(
                "  {} {}",
                "Last Block:".bold(),
                result["hash_of_last_block"].as_str().unwrap_or("-")
            );
            println!(
                "  {} {}",
                "Since Last Block:".bold(),
                result["time_since_last_block"].as_str().unwrap_or("-")
            );
        }

        Commands::LastBlocks { .. } | Commands::Blocks { .. } => {
            let blocks: Blocks = serde_json::from_value(result)?;
            if blocks.blocks.is_empty() {
                println!("{}", "No blocks in range".yellow());
            } else {
                println!("{}", Table::new(blocks.blocks));
            }
        }

        Commands::Outputs { .. } => {
            let outputs: Outputs = serde_json::from_value(result)?;
            if outputs.outputs.is_empty() {
                println!("{}", "No unspent outputs".yellow());
            } else {
                let total: u64 = outputs.outputs.iter().map(|o| o.coins).sum();
                println!("{}", Table::new(&outputs.outputs));
                println!();
                println!("  {} {}", "Total coins:".bold(), total);
            }
        }
    }

    Ok(())
}
