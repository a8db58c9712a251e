//! Shared fixtures: one mock server stands in for Gamma, the CLOB and the RPC

#![allow(dead_code)]

use poly_trade::config::{ClientConfig, ClientSettings};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RPC_PATH: &str = "/rpc";

/// Settings pointing every endpoint at `server`, with API credentials set
pub fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        private_key: Some(TEST_KEY.to_string()),
        clob_url: server.uri(),
        gamma_url: server.uri(),
        polygon_rpc: format!("{}{}", server.uri(), RPC_PATH),
        api_key: Some("api-key".to_string()),
        api_secret: Some("dGVzdC1zZWNyZXQtYnl0ZXM=".to_string()),
        api_passphrase: Some("pass".to_string()),
        ..ClientSettings::default()
    }
}

pub fn dry_run_config(server: &MockServer) -> ClientConfig {
    settings(server).validate().unwrap()
}

pub fn live_config(server: &MockServer) -> ClientConfig {
    let mut settings = settings(server);
    settings.dry_run = false;
    settings.validate().unwrap()
}

pub fn config_with_storage(server: &MockServer, db_path: &Path) -> ClientConfig {
    let mut settings = settings(server);
    settings.enable_storage = true;
    settings.db_path = db_path.to_path_buf();
    settings.validate().unwrap()
}

/// Answer `eth_chainId` and `eth_blockNumber`
pub async fn mount_rpc(server: &MockServer, chain_id: u64, block: u64) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({"method": "eth_chainId"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("{:#x}", chain_id)
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("{:#x}", block)
        })))
        .mount(server)
        .await;
}

/// A Gamma listing item with JSON-encoded outcome lists
pub fn gamma_market(id: &str, question: &str) -> Value {
    json!({
        "id": id,
        "question": question,
        "description": format!("Resolution rules for {}", question),
        "endDate": "2030-01-01T00:00:00Z",
        "active": true,
        "volume": "25000.5",
        "liquidity": "1200",
        "outcomes": "[\"Yes\", \"No\"]",
        "outcomePrices": "[\"0.62\", \"0.38\"]",
        "clobTokenIds": format!("[\"{id}1\", \"{id}2\"]"),
        "conditionId": format!("0xcond{id}"),
        "negRisk": false
    })
}
