//! JSON-RPC Envelope Types
//!
//! Request/Response objects exchanged over HTTP POST, plus the typed
//! results of the node query methods.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use webrpc_core::domain::{Block, UnspentOutput};

/// Protocol version literal, always present on output
pub const JSONRPC_VERSION: &str = "2.0";

/// Method parameters: string keys to string values
pub type Params = HashMap<String, String>;

/// Validated JSON-RPC request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Params,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Params, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Request as read off the wire, before validation
///
/// Every field is optional so that a structurally incomplete body is
/// reported as "Invalid Request" rather than "Parse error".
#[derive(Debug, Deserialize)]
pub(crate) struct RawRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Params>,
}

/// Result or error; a response always carries exactly one of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Result(Value),
    Error(RpcError),
}

/// JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echoed request id; null when it could not be determined
    pub id: Option<String>,
    pub jsonrpc: String,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Response {
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: Some(id.into()),
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: Payload::Result(result),
        }
    }

    pub fn error(id: Option<String>, error: RpcError) -> Self {
        Self {
            id,
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: Payload::Error(error),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Result(v) => Some(v),
            Payload::Error(_) => None,
        }
    }

    pub fn rpc_error(&self) -> Option<&RpcError> {
        match &self.payload {
            Payload::Result(_) => None,
            Payload::Error(e) => Some(e),
        }
    }
}

/// get_lastblocks / get_blocks result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksResult {
    pub blocks: Vec<Block>,
}

/// get_outputs result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsResult {
    pub outputs: Vec<UnspentOutput>,
}
