// Port Layer - Interfaces for external dependencies

pub mod gateway;
pub mod time_provider;

// Re-exports
pub use gateway::Gateway;
pub use time_provider::TimeProvider;
