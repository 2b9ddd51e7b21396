// Daemon configuration, read once from the environment

use anyhow::{bail, Context, Result};
use webrpc_api_rpc::{DispatchConfig, RpcServerConfig};
use webrpc_core::domain::Network;

const DEFAULT_DB_PATH: &str = "~/.webrpc/chain.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    pub db_path: String,
    pub network: Network,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RpcServerConfig::default();

        let host = lookup("WEBRPC_HOST").unwrap_or(defaults.host);
        let port = parse_or("WEBRPC_PORT", &lookup, defaults.port)?;
        let queue_size = parse_or("WEBRPC_QUEUE_SIZE", &lookup, defaults.dispatch.queue_size)?;
        let worker_count = parse_or("WEBRPC_WORKERS", &lookup, defaults.dispatch.worker_count)?;

        let db_path = lookup("WEBRPC_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = shellexpand::tilde(&db_path).into_owned();

        let network = match lookup("WEBRPC_NETWORK") {
            Some(raw) => raw
                .parse::<Network>()
                .with_context(|| format!("WEBRPC_NETWORK must be 'main' or 'test', got '{}'", raw))?,
            None => Network::default(),
        };

        let log_format = match lookup("WEBRPC_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("WEBRPC_LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        let rpc = RpcServerConfig {
            host,
            port,
            dispatch: DispatchConfig {
                queue_size,
                worker_count,
            },
        };
        rpc.validate().context("invalid RPC server configuration")?;

        Ok(Self {
            rpc,
            db_path,
            network,
            log_format,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.rpc.addr(), "127.0.0.1:6422");
        assert_eq!(config.rpc.dispatch.queue_size, 1000);
        assert_eq!(config.rpc.dispatch.worker_count, 5);
        assert_eq!(config.network, Network::Test);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.db_path.ends_with(".webrpc/chain.db"));
        assert!(!config.db_path.starts_with('~'));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("WEBRPC_HOST", "0.0.0.0"),
            ("WEBRPC_PORT", "7000"),
            ("WEBRPC_QUEUE_SIZE", "16"),
            ("WEBRPC_WORKERS", "2"),
            ("WEBRPC_DB_PATH", "/tmp/chain.db"),
            ("WEBRPC_NETWORK", "main"),
            ("WEBRPC_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.rpc.addr(), "0.0.0.0:7000");
        assert_eq!(config.rpc.dispatch.queue_size, 16);
        assert_eq!(config.rpc.dispatch.worker_count, 2);
        assert_eq!(config.db_path, "/tmp/chain.db");
        assert_eq!(config.network, Network::Main);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config(&[("WEBRPC_PORT", "http")]).is_err());
        assert!(config(&[("WEBRPC_WORKERS", "0")]).is_err());
        assert!(config(&[("WEBRPC_QUEUE_SIZE", "-1")]).is_err());
        assert!(config(&[("WEBRPC_NETWORK", "regtest")]).is_err());
        assert!(config(&[("WEBRPC_LOG_FORMAT", "xml")]).is_err());
    }
}
