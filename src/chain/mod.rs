//! Polygon JSON-RPC probe
//!
//! Only the two read calls the client needs: `eth_chainId` and
//! `eth_blockNumber`. Any failure is a [`PolymarketError::Network`].

use crate::error::{PolymarketError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// JSON-RPC client for a chain endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PolymarketError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.call_u64("eth_chainId").await
    }

    /// Latest block height
    pub async fn block_number(&self) -> Result<u64> {
        self.call_u64("eth_blockNumber").await
    }

    /// Check that the endpoint answers and serves `expected_chain_id`
    pub async fn probe(&self, expected_chain_id: u64) -> Result<u64> {
        let chain_id = self.chain_id().await?;
        if chain_id != expected_chain_id {
            return Err(PolymarketError::Network(format!(
                "RPC endpoint serves chain {}, expected {}",
                chain_id, expected_chain_id
            )));
        }
        let block = self.block_number().await?;
        tracing::info!(url = %self.url, chain_id, block, "Connected to chain RPC");
        Ok(block)
    }

    async fn call_u64(&self, method: &str) -> Result<u64> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": [],
            "id": 1
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PolymarketError::Network(format!("{} failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolymarketError::Network(format!(
                "{} failed: RPC returned {}",
                method, status
            )));
        }

        let resp: RpcResponse = response
            .json()
            .await
            .map_err(|e| {
                PolymarketError::Network(format!("{} returned invalid JSON: {}", method, e))
            })?;

        if let Some(error) = resp.error {
            return Err(PolymarketError::Network(format!(
                "{} rejected ({}): {}",
                method, error.code, error.message
            )));
        }

        resp.result
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_hex_u64)
            .ok_or_else(|| PolymarketError::Network(format!("{} returned no quantity", method)))
    }
}

/// Parse a `0x`-prefixed hex quantity
fn parse_hex_u64(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": rpc_method})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": result
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_u64("0x89"), Some(137));
        assert_eq!(parse_hex_u64("0x0"), Some(0));
        assert_eq!(parse_hex_u64("zz"), None);
    }

    #[tokio::test]
    async fn test_probe_reports_block() {
        let server = MockServer::start().await;
        mount(&server, "eth_chainId", json!("0x89")).await;
        mount(&server, "eth_blockNumber", json!("0x3b9aca0")).await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        assert_eq!(rpc.chain_id().await.unwrap(), 137);
        assert_eq!(rpc.probe(137).await.unwrap(), 62_500_000);
    }

    #[tokio::test]
    async fn test_probe_wrong_chain() {
        let server = MockServer::start().await;
        mount(&server, "eth_chainId", json!("0x13882")).await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let err = rpc.probe(137).await.unwrap_err();
        assert!(matches!(err, PolymarketError::Network(_)));
    }

    #[tokio::test]
    async fn test_rpc_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": "method not found"}
            })))
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let err = rpc.block_number().await.unwrap_err();
        assert!(err.to_string().contains("method not found"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let rpc = RpcClient::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(
            rpc.chain_id().await.unwrap_err(),
            PolymarketError::Network(_)
        ));
    }
}
