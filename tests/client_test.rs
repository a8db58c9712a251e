//! Integration tests for the client facade

mod common;

use common::{
    config_with_storage, dry_run_config, gamma_market, mount_rpc, settings, TEST_ADDRESS,
};
use poly_trade::clob::HttpClob;
use poly_trade::{MarketQuery, PolymarketClient, PolymarketError, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_connect_probes_rpc() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 0x3a1f20).await;

    let client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    assert_eq!(client.wallet_address(), TEST_ADDRESS);
    assert!(client.clob().has_credentials());

    let report = client.health_check().await;
    assert!(report.healthy);
    assert!(report.rpc_connected);
    assert_eq!(report.latest_block, Some(0x3a1f20));
    assert_eq!(report.chain_id, 137);
    assert!(report.dry_run);
    assert_eq!(report.cache_size, Some(0));
    assert!(report.storage_stats.is_none());
}

#[tokio::test]
async fn test_connect_rejects_wrong_chain() {
    let server = MockServer::start().await;
    mount_rpc(&server, 1, 100).await;

    let err = PolymarketClient::connect(dry_run_config(&server))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PolymarketError::Network(_)));
}

#[tokio::test]
async fn test_connect_unreachable_rpc_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = PolymarketClient::connect(dry_run_config(&server))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PolymarketError::Network(_)));
}

#[tokio::test]
async fn test_market_listing_is_cached() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            gamma_market("1", "Will the Fed cut rates?"),
            gamma_market("2", "Bitcoin above 150k?")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let query = MarketQuery::new(true, 2);

    let first = client.get_markets(&query, true).await.unwrap();
    let second = client.get_markets(&query, true).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].category, "crypto");
    assert_eq!(first[0].outcomes[0].token_id, "11");
    assert_eq!(first[0].outcomes[0].price, dec!(0.62));
}

#[tokio::test]
async fn test_malformed_market_is_skipped() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            gamma_market("1", "First"),
            {"id": "2", "active": true},
            gamma_market("3", "Third")
        ])))
        .mount(&server)
        .await;

    let mut client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let markets = client
        .get_markets(&MarketQuery::new(true, 3), false)
        .await
        .unwrap();
    let ids: Vec<_> = markets.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_gamma_error_status_surfaces() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let err = client
        .get_markets(&MarketQuery::default(), true)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_search_filters_by_text() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            gamma_market("1", "Will Bitcoin hit 200k?"),
            gamma_market("2", "NBA champion 2030"),
            gamma_market("3", "bitcoin ETF inflows")
        ])))
        .mount(&server)
        .await;

    let mut client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let found = client.search_markets("BITCOIN", 1).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "1");
}

#[tokio::test]
async fn test_orderbook_and_mid_price() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/book"))
        .and(query_param("token_id", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "market": "0xcond1",
            "asset_id": "11",
            "bids": [{"price": "0.48", "size": "100"}, {"price": "0.50", "size": "20"}],
            "asks": [{"price": "0.56", "size": "50"}, {"price": "0.54", "size": "0"}],
            "timestamp": "1700000000000"
        })))
        .mount(&server)
        .await;

    let client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let book = client.get_orderbook("11").await.unwrap();
    assert_eq!(book.best_bid(), Some(dec!(0.50)));
    assert_eq!(book.best_ask(), Some(dec!(0.56)));
    assert_eq!(book.asks.len(), 1);
    assert_eq!(client.get_mid_price("11").await, dec!(0.53));
}

#[tokio::test]
async fn test_missing_orderbook_is_api_error() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No orderbook exists"))
        .mount(&server)
        .await;

    let client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let err = client.get_orderbook("999").await.unwrap_err();
    assert!(matches!(err, PolymarketError::Api { .. }));
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(client.get_mid_price("999").await, Decimal::ZERO);
}

#[tokio::test]
async fn test_price_failure_is_zero() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/price"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    assert_eq!(client.get_price("11", Side::Buy).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_price_is_stored_as_orderbook_source() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/price"))
        .and(query_param("side", "SELL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": "0.5"})))
        .mount(&server)
        .await;

    let client = PolymarketClient::connect(config_with_storage(&server, &dir.path().join("p.db")))
        .await
        .unwrap();
    assert_eq!(client.get_price("11", Side::Sell).await, dec!(0.5));

    let stored = client.storage().unwrap().get_recent_prices("11", 10);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].source, "orderbook");
    assert_eq!(stored[0].price, dec!(0.5));
}

#[tokio::test]
async fn test_balances_are_scaled() {
    let server = MockServer::start().await;
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/balance-allowance"))
        .and(query_param("asset_type", "COLLATERAL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": "2500000"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/balance-allowance"))
        .and(query_param("asset_type", "CONDITIONAL"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PolymarketClient::connect(dry_run_config(&server))
        .await
        .unwrap();
    let balance = client.get_balance_info().await;
    assert_eq!(balance.usdc_balance, dec!(2.5));
    assert_eq!(balance.available_balance, dec!(2.5));
    assert_eq!(balance.total_position_value, Decimal::ZERO);
    assert_eq!(client.get_token_balance("11").await, Decimal::ZERO);
}

#[tokio::test]
async fn test_cleanup_and_storage_stats() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_rpc(&server, 137, 1).await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([gamma_market("1", "Stored")])),
        )
        .mount(&server)
        .await;

    let mut client =
        PolymarketClient::connect(config_with_storage(&server, &dir.path().join("c.db")))
            .await
            .unwrap();
    client
        .get_markets(&MarketQuery::default(), true)
        .await
        .unwrap();

    let storage = client.storage().unwrap();
    assert_eq!(storage.get_market("1").unwrap().question, "Stored");
    let now = chrono::Utc::now();
    storage.save_price_at("11", dec!(0.4), dec!(0), "api", now - chrono::Duration::days(40));
    storage.save_price_at("11", dec!(0.6), dec!(0), "api", now);

    assert_eq!(client.cleanup_old_data(30), Some(1));

    let report = client.health_check().await;
    let stats = report.storage_stats.unwrap();
    assert_eq!(stats.markets, 1);
    assert_eq!(stats.prices, 1);
}

#[tokio::test]
async fn test_cleanup_without_storage() {
    let server = MockServer::start().await;
    let config = settings(&server).validate().unwrap();
    let client = PolymarketClient::from_parts(config, dummy_clob(&server), TEST_ADDRESS).unwrap();
    assert_eq!(client.cleanup_old_data(30), None);
}

fn dummy_clob(server: &MockServer) -> HttpClob {
    let wallet = poly_trade::clob::Wallet::from_private_key(common::TEST_KEY).unwrap();
    HttpClob::new(&server.uri(), 137, wallet).unwrap()
}
