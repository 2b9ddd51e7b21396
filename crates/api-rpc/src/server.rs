//! JSON-RPC Server
//!
//! Single HTTP endpoint on TCP. Every path is served by the same handler;
//! non-POST verbs get a plain-text 405, everything else a JSON-RPC response.

use crate::dispatch::{DispatchConfig, Dispatcher, ShutdownToken, WorkerPool};
use crate::error::{DispatchError, NOT_POST_MESSAGE};
use crate::registry::Registry;
use crate::validator::{validate, Validation};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::any;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use webrpc_core::port::Gateway;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 6422;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// RPC Server Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port
    pub port: u16,
    pub dispatch: DispatchConfig,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl RpcServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.trim().is_empty() {
            return Err(DispatchError::InvalidConfig("host must not be empty".to_string()).into());
        }
        self.dispatch.validate()?;
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    registry: Arc<Registry>,
    dispatcher: Dispatcher,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    registry: Arc<Registry>,
    gateway: Arc<dyn Gateway>,
}

/// Bound listener with its workers already running
pub struct RunningServer {
    local_addr: SocketAddr,
    listener: TcpListener,
    router: Router,
    workers: WorkerPool,
    shutdown: ShutdownToken,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        registry: Arc<Registry>,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        Self {
            config,
            registry,
            gateway,
        }
    }

    /// Bind the listener and start the worker pool
    ///
    /// Workers start before the first connection is accepted, so nothing is
    /// admitted without someone to serve it.
    pub async fn bind(self, shutdown: ShutdownToken) -> Result<RunningServer, ServerError> {
        self.config.validate()?;

        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!(
            addr = %local_addr,
            methods = ?self.registry.methods(),
            "JSON-RPC server bound"
        );

        let (dispatcher, workers) = Dispatcher::start(
            self.config.dispatch,
            Arc::clone(&self.registry),
            self.gateway,
            shutdown.clone(),
        )?;

        let router = router(AppState {
            registry: self.registry,
            dispatcher,
        });

        Ok(RunningServer {
            local_addr,
            listener,
            router,
            workers,
            shutdown,
        })
    }

    /// Bind and serve until the shutdown token fires
    pub async fn start(self, shutdown: ShutdownToken) -> Result<(), ServerError> {
        self.bind(shutdown).await?.run().await
    }
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until shutdown, then wait for the queue to drain
    ///
    /// In-flight connections are allowed to finish; their requests are
    /// still answered because workers keep draining the queue.
    pub async fn run(self) -> Result<(), ServerError> {
        let RunningServer {
            local_addr,
            listener,
            router,
            workers,
            shutdown,
        } = self;

        info!(addr = %local_addr, "JSON-RPC server started");

        let mut signal = shutdown;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                signal.wait().await;
                info!("Shutdown signal received, no longer accepting connections");
            })
            .await?;

        workers.join().await;
        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Run on a background task
    pub fn spawn(self) -> JoinHandle<Result<(), ServerError>> {
        tokio::spawn(self.run())
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(rpc_endpoint))
        .fallback(rpc_endpoint)
        // Bodies of any size reach the validator; an oversized address list
        // is still a JSON-RPC call
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn rpc_endpoint(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> HttpResponse {
    match validate(&method, &body, &state.registry) {
        Validation::NotPost => {
            debug!(method = %method, "Rejecting non-POST request");
            (StatusCode::METHOD_NOT_ALLOWED, NOT_POST_MESSAGE).into_response()
        }
        Validation::Rejected(response) => Json(response).into_response(),
        Validation::Accepted(request) => {
            let response = state.dispatcher.submit(request).await;
            Json(response).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::shutdown_channel;
    use crate::handler::node_registry;
    use std::time::Duration;
    use webrpc_core::domain::Network;
    use webrpc_core::port::gateway::mocks::MockGateway;

    fn test_config() -> RpcServerConfig {
        RpcServerConfig {
            port: 0,
            ..Default::default()
        }
    }

    fn server(config: RpcServerConfig) -> RpcServer {
        RpcServer::new(
            config,
            Arc::new(node_registry(Network::Test).unwrap()),
            Arc::new(MockGateway::new_success()),
        )
    }

    #[test]
    fn test_default_config() {
        let config = RpcServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:6422");
        assert_eq!(config.dispatch.queue_size, 1000);
        assert_eq!(config.dispatch.worker_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_workers() {
        let mut config = test_config();
        config.dispatch.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ServerError::Dispatch(DispatchError::InvalidConfig(_)))
        ));
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let (sender, token) = shutdown_channel();
        let running = server(test_config()).bind(token).await.unwrap();

        assert!(running.local_addr().ip().is_loopback());
        assert_ne!(running.local_addr().port(), 0);
        drop(sender);
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config_before_binding() {
        let (_sender, token) = shutdown_channel();
        let mut config = test_config();
        config.dispatch.queue_size = 0;

        assert!(server(config).bind(token).await.is_err());
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() {
        let (sender, token) = shutdown_channel();
        let handle = server(test_config()).bind(token).await.unwrap().spawn();

        sender.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
