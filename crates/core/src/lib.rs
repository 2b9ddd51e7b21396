// WebRPC Core - Domain Types, Address Codec & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
