//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 over HTTP POST for the node's read-only queries. Requests
//! are validated, admitted to a bounded queue and executed by a fixed pool
//! of workers against the [`webrpc_core::port::Gateway`] port.

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod registry;
pub mod server;
pub mod types;
pub mod validator;

pub use dispatch::{shutdown_channel, DispatchConfig, Dispatcher, ShutdownSender, ShutdownToken};
pub use error::{code, DispatchError, ErrorCode, HandlerError, RpcError};
pub use handler::node_registry;
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use server::{RpcServer, RpcServerConfig, RunningServer, ServerError};
pub use types::{Params, Request, Response};
