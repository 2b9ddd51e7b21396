//! Node Method Handlers
//!
//! Thin adapters from JSON-RPC params onto the [`Gateway`] port. Each
//! handler validates its own params and reports bad input as
//! [`HandlerError::InvalidParams`].

use crate::error::HandlerError;
use crate::registry::{Registry, RegistryBuilder, RegistryError};
use crate::types::{BlocksResult, OutputsResult, Params};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use webrpc_core::domain::{Address, Network};
use webrpc_core::error::AppError;
use webrpc_core::port::Gateway;

pub const GET_STATUS: &str = "get_status";
pub const GET_LAST_BLOCKS: &str = "get_lastblocks";
pub const GET_BLOCKS: &str = "get_blocks";
pub const GET_OUTPUTS: &str = "get_outputs";

/// Build the registry with the node's fixed method set
///
/// `network` selects which address version `get_outputs` accepts.
pub fn node_registry(network: Network) -> Result<Registry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    builder
        .register(GET_STATUS, get_status)?
        .register(GET_LAST_BLOCKS, get_last_blocks)?
        .register(GET_BLOCKS, get_blocks)?
        .register(GET_OUTPUTS, move |params, gateway| {
            get_outputs(params, gateway, network)
        })?;
    Ok(builder.build())
}

/// get_status
pub async fn get_status(
    _params: Params,
    gateway: Arc<dyn Gateway>,
) -> Result<Value, HandlerError> {
    let status = gateway.status().await?;
    to_value(&status)
}

/// get_lastblocks { "num": "<u64>" }
pub async fn get_last_blocks(
    params: Params,
    gateway: Arc<dyn Gateway>,
) -> Result<Value, HandlerError> {
    let num = parse_u64(&params, "num")?;
    let blocks = gateway.last_blocks(num).await?;
    to_value(&BlocksResult { blocks })
}

/// get_blocks { "start": "<u64>", "end": "<u64>" }
pub async fn get_blocks(
    params: Params,
    gateway: Arc<dyn Gateway>,
) -> Result<Value, HandlerError> {
    let start = parse_u64(&params, "start")?;
    let end = parse_u64(&params, "end")?;
    if start > end {
        return Err(HandlerError::InvalidParams(format!(
            "start {} is greater than end {}",
            start, end
        )));
    }

    let blocks = gateway.blocks(start, end).await?;
    to_value(&BlocksResult { blocks })
}

/// get_outputs { "addresses": "<addr>[,<addr>...]" }
pub async fn get_outputs(
    params: Params,
    gateway: Arc<dyn Gateway>,
    network: Network,
) -> Result<Value, HandlerError> {
    let raw = required(&params, "addresses")?;
    let addresses = parse_addresses(raw, network)?;

    let outputs = gateway.unspent_outputs(&addresses).await?;
    to_value(&OutputsResult { outputs })
}

fn required<'a>(params: &'a Params, key: &str) -> Result<&'a str, HandlerError> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HandlerError::missing(key))
}

fn parse_u64(params: &Params, key: &str) -> Result<u64, HandlerError> {
    let raw = required(params, key)?;
    raw.parse().map_err(|_| {
        HandlerError::InvalidParams(format!(
            "param '{}' must be an unsigned integer, got '{}'",
            key, raw
        ))
    })
}

/// Parse a comma-separated address list, keeping the first occurrence of each
fn parse_addresses(raw: &str, network: Network) -> Result<Vec<Address>, HandlerError> {
    let mut seen = HashSet::new();
    let mut addrs = Vec::new();

    for s in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let address = Address::parse_for_network(s, network).map_err(|e| {
            HandlerError::InvalidParams(format!("invalid address '{}': {}", s, e))
        })?;
        if seen.insert(address) {
            addrs.push(address);
        }
    }

    if addrs.is_empty() {
        return Err(HandlerError::missing("addresses"));
    }
    Ok(addrs)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::App(AppError::from(e)))
}
