//! WebRPC Node - Main Entry Point
//! Serves read-only chain queries over JSON-RPC

mod config;

use anyhow::{Context, Result};
use config::{DaemonConfig, LogFormat};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use webrpc_api_rpc::dispatch::constants::SHUTDOWN_DRAIN_TIMEOUT;
use webrpc_api_rpc::{node_registry, shutdown_channel, RpcServer};
use webrpc_core::port::time_provider::SystemTimeProvider;
use webrpc_core::port::Gateway;
use webrpc_infra_sqlite::{create_pool, run_migrations, SqliteChainIndex};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("webrpc=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("WebRPC node v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(parent) = Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!(db_path = %config.db_path, "Initializing chain index...");

    let pool = create_pool(&config.db_path)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let gateway: Arc<dyn Gateway> =
        Arc::new(SqliteChainIndex::new(pool, Arc::new(SystemTimeProvider)));
    let registry = Arc::new(node_registry(config.network).context("Handler registration failed")?);

    // 5. Start JSON-RPC server
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let server = RpcServer::new(config.rpc.clone(), registry, gateway)
        .bind(shutdown_rx)
        .await
        .context("RPC server start failed")?;

    info!(
        addr = %server.local_addr(),
        network = %config.network,
        queue_size = config.rpc.dispatch.queue_size,
        workers = config.rpc.dispatch.worker_count,
        "System ready"
    );
    info!("Press Ctrl+C to shutdown");

    let mut server_handle = server.spawn();

    // 6. Wait for shutdown signal (or the server dying on its own)
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown signal received. Draining queue...");
        }
        result = &mut server_handle => {
            shutdown_tx.shutdown();
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e).context("RPC server failed"),
                Err(e) => Err(e).context("RPC server task panicked"),
            };
        }
    }

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    match tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("Shutdown complete."),
        Ok(Ok(Err(e))) => error!(error = %e, "RPC server stopped with error"),
        Ok(Err(e)) => error!(error = %e, "RPC server task panicked"),
        Err(_) => warn!(
            timeout_secs = SHUTDOWN_DRAIN_TIMEOUT.as_secs(),
            "Drain timed out, exiting with requests still queued"
        ),
    }

    Ok(())
}
