// Webrpc Infrastructure - SQLite Adapter
// Implements: Gateway over the node's chain index

mod chain_index;
mod connection;
mod migration;

pub use chain_index::SqliteChainIndex;
pub use connection::create_pool;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
