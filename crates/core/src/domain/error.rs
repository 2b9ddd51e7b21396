// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("Invalid address length: expected {expected} bytes, got {actual}")]
    InvalidAddressLength { expected: usize, actual: usize },

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Invalid address version: expected {expected:#04x}, got {actual:#04x}")]
    InvalidVersion { expected: u8, actual: u8 },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid block range: start {start} > end {end}")]
    InvalidBlockRange { start: u64, end: u64 },
}

pub type Result<T> = std::result::Result<T, DomainError>;
