//! RPC Error Types
//!
//! Closed JSON-RPC error taxonomy and the mapping from handler and
//! dispatch failures onto it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use webrpc_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    // -32000 to -32099: reserved for implementation-defined server errors
    pub const SERVER_BUSY: i32 = -32000;
    pub const SHUTTING_DOWN: i32 = -32001;
}

/// Message for the non-protocol rejection of anything but POST
pub const NOT_POST_MESSAGE: &str = "only support http POST";

/// Message for a request carrying the wrong protocol version
pub const INVALID_JSONRPC_MESSAGE: &str = "invalid jsonrpc";

/// Every error a response may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerBusy,
    ShuttingDown,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::ParseError => code::PARSE_ERROR,
            ErrorCode::InvalidRequest => code::INVALID_REQUEST,
            ErrorCode::MethodNotFound => code::METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => code::INVALID_PARAMS,
            ErrorCode::InternalError => code::INTERNAL_ERROR,
            ErrorCode::ServerBusy => code::SERVER_BUSY,
            ErrorCode::ShuttingDown => code::SHUTTING_DOWN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ServerBusy => "Server busy",
            ErrorCode::ShuttingDown => "Server shutting down",
        }
    }
}

/// Response error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    pub fn new(kind: ErrorCode) -> Self {
        Self {
            code: kind.code(),
            message: kind.message().to_string(),
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Failure reported by a method handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Caller supplied missing or malformed params
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl HandlerError {
    pub fn missing(key: &str) -> Self {
        HandlerError::InvalidParams(format!("missing required param '{}'", key))
    }
}

impl From<&HandlerError> for RpcError {
    fn from(err: &HandlerError) -> Self {
        match err {
            HandlerError::InvalidParams(detail) => {
                RpcError::new(ErrorCode::InvalidParams).with_data(detail.clone())
            }
            HandlerError::App(AppError::Domain(e)) => {
                RpcError::new(ErrorCode::InvalidParams).with_data(e.to_string())
            }
            // Execution failures are logged by the worker, not leaked to callers
            HandlerError::App(_) => RpcError::new(ErrorCode::InternalError),
        }
    }
}

/// Admission failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatch queue full (capacity {capacity})")]
    Overloaded { capacity: usize },

    #[error("dispatcher is shutting down")]
    ShuttingDown,

    #[error("invalid dispatch config: {0}")]
    InvalidConfig(String),
}

impl From<&DispatchError> for RpcError {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::Overloaded { .. } => RpcError::new(ErrorCode::ServerBusy),
            DispatchError::ShuttingDown => RpcError::new(ErrorCode::ShuttingDown),
            DispatchError::InvalidConfig(_) => RpcError::new(ErrorCode::InternalError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webrpc_core::domain::DomainError;

    #[test]
    fn test_codes_match_jsonrpc_table() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InvalidParams.code(), -32602);
        assert_eq!(ErrorCode::InternalError.code(), -32603);
    }

    #[test]
    fn test_server_codes_in_reserved_range() {
        for kind in [ErrorCode::ServerBusy, ErrorCode::ShuttingDown] {
            assert!((-32099..=-32000).contains(&kind.code()));
        }
        assert_ne!(ErrorCode::ServerBusy.code(), ErrorCode::ShuttingDown.code());
    }

    #[test]
    fn test_handler_error_mapping() {
        let err = HandlerError::missing("num");
        let rpc = RpcError::from(&err);
        assert_eq!(rpc.code, code::INVALID_PARAMS);
        assert_eq!(rpc.data.as_deref(), Some("missing required param 'num'"));

        let err = HandlerError::App(AppError::Domain(DomainError::InvalidChecksum));
        assert_eq!(RpcError::from(&err).code, code::INVALID_PARAMS);

        let err = HandlerError::App(AppError::Database("disk I/O error".into()));
        let rpc = RpcError::from(&err);
        assert_eq!(rpc.code, code::INTERNAL_ERROR);
        assert_eq!(rpc.message, "Internal error");
        assert!(rpc.data.is_none());
    }

    #[test]
    fn test_dispatch_error_mapping() {
        let busy = RpcError::from(&DispatchError::Overloaded { capacity: 4 });
        assert_eq!(busy.code, code::SERVER_BUSY);

        let down = RpcError::from(&DispatchError::ShuttingDown);
        assert_eq!(down.code, code::SHUTTING_DOWN);
    }
}
