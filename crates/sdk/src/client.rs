//! Node Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{Block, BlockchainStatus, BlocksResult, OutputsResult, UnspentOutput};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::core::traits::ToRpcParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const GET_STATUS: &str = "get_status";
const GET_LAST_BLOCKS: &str = "get_lastblocks";
const GET_BLOCKS: &str = "get_blocks";
const GET_OUTPUTS: &str = "get_outputs";

/// Node query client
///
/// Every param is sent as a JSON string under a named key and request ids
/// are strings, which is what the node's envelope requires.
///
/// # Example
///
/// ```no_run
/// use webrpc_sdk::NodeClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NodeClient::connect("http://127.0.0.1:6422").await?;
/// let blocks = client.blocks(10, 20).await?;
/// # Ok(())
/// # }
/// ```
pub struct NodeClient {
    client: HttpClient,
}

impl NodeClient {
    /// Connect to a node
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:6422`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::connect_with_timeout(url, Duration::from_secs(30)).await
    }

    pub async fn connect_with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .id_format(jsonrpsee::core::client::IdKind::String)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Node status
    pub async fn status(&self) -> Result<BlockchainStatus> {
        self.call(GET_STATUS, ObjectParams::new()).await
    }

    /// The most recent `num` blocks, oldest first
    pub async fn last_blocks(&self, num: u64) -> Result<Vec<Block>> {
        let params = string_params(&[("num", num.to_string())])?;
        let result: BlocksResult = self.call(GET_LAST_BLOCKS, params).await?;
        Ok(result.blocks)
    }

    /// Blocks with `start <= seq <= end`
    pub async fn blocks(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        let params = string_params(&[("start", start.to_string()), ("end", end.to_string())])?;
        let result: BlocksResult = self.call(GET_BLOCKS, params).await?;
        Ok(result.blocks)
    }

    /// Unspent outputs owned by any of `addresses` (base58)
    pub async fn outputs<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<UnspentOutput>> {
        let joined = addresses
            .iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let params = string_params(&[("addresses", joined)])?;
        let result: OutputsResult = self.call(GET_OUTPUTS, params).await?;
        Ok(result.outputs)
    }

    async fn call<R, P>(&self, method: &str, params: P) -> Result<R>
    where
        R: DeserializeOwned,
        P: ToRpcParams + Send,
    {
        Ok(self.client.request(method, params).await?)
    }
}

fn string_params(pairs: &[(&str, String)]) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    for (key, value) in pairs {
        params.insert(key, value)?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_string_valued() {
        let params = string_params(&[("start", "1".to_string()), ("end", "20".to_string())])
            .unwrap()
            .to_rpc_params()
            .unwrap()
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(params.get()).unwrap();
        assert_eq!(value, serde_json::json!({"start": "1", "end": "20"}));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = NodeClient::connect("not a url").await;
        assert!(matches!(result, Err(SdkError::Connection(_))));
    }
}
