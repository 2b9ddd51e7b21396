//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Node answered "Server busy"
pub const SERVER_BUSY: i32 = -32000;
/// Node is shutting down
pub const SHUTTING_DOWN: i32 = -32001;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error ({code}): {message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// True when the node rejected the call for load or shutdown and a
    /// later retry may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == SERVER_BUSY || *code == SHUTTING_DOWN)
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
                // Detail is sent as a JSON string; unwrap it when it is one
                data: call_err.data().map(|raw| {
                    serde_json::from_str::<String>(raw.get())
                        .unwrap_or_else(|_| raw.get().to_string())
                }),
            },
            jsonrpsee::core::ClientError::Transport(e) => SdkError::Transport(e.to_string()),
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Serialization(e),
            _ => SdkError::Other(e.to_string()),
        }
    }
}
