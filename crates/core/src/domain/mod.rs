// Domain Layer - Chain entities and the address codec

pub mod address;
pub mod block;
pub mod error;
pub mod output;
pub mod status;

// Re-exports
pub use address::{Address, Checksum, Network};
pub use block::{Block, BlockSeq};
pub use error::DomainError;
pub use output::UnspentOutput;
pub use status::BlockchainStatus;
