//! Client facade
//!
//! [`PolymarketClient`] ties the pieces together: market discovery through
//! the cached fetcher, order execution through the CLOB boundary, balances,
//! position sizing and the optional snapshot store. The configuration is
//! passed in explicitly; there is no global state.

use crate::chain::RpcClient;
use crate::clob::{AssetType, ClobApi, ClobError, HttpClob, Wallet};
use crate::config::ClientConfig;
use crate::error::{PolymarketError, Result};
use crate::execution::{Execution, OrderExecutor, OrderInfo, OrderRequest, OrderType, Side};
use crate::market::{GammaClient, MarketFetcher, MarketQuery, MarketRecord};
use crate::orderbook::OrderBookSummary;
use crate::risk::PositionSizer;
use crate::storage::{SqliteStore, StorageStats};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Price source label for stored order book prices
const ORDERBOOK_SOURCE: &str = "orderbook";

/// Account balances in USDC
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceInfo {
    pub usdc_balance: Decimal,
    pub total_position_value: Decimal,
    pub available_balance: Decimal,
    pub margin_used: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl BalanceInfo {
    /// All-zero balances, used when the CLOB cannot be reached
    pub fn zero() -> Self {
        Self {
            usdc_balance: Decimal::ZERO,
            total_position_value: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            margin_used: Decimal::ZERO,
            last_updated: Utc::now(),
        }
    }

    pub fn total_equity(&self) -> Decimal {
        self.usdc_balance + self.total_position_value
    }

    /// Margin used over total equity, 0 when there is no equity
    pub fn margin_ratio(&self) -> Decimal {
        let equity = self.total_equity();
        if equity.is_zero() {
            Decimal::ZERO
        } else {
            self.margin_used / equity
        }
    }
}

/// Result of [`PolymarketClient::health_check`]
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub wallet_address: String,
    pub dry_run: bool,
    pub chain_id: u64,
    pub rpc_connected: bool,
    pub latest_block: Option<u64>,
    pub cache_size: Option<usize>,
    pub storage_stats: Option<StorageStats>,
    pub healthy: bool,
    pub error: Option<String>,
}

/// Unified Polymarket client
pub struct PolymarketClient<C: ClobApi = HttpClob> {
    config: ClientConfig,
    wallet_address: String,
    clob: C,
    rpc: RpcClient,
    markets: MarketFetcher,
    storage: Option<SqliteStore>,
    sizer: PositionSizer,
}

impl PolymarketClient<HttpClob> {
    /// Connect to the chain RPC and the CLOB
    ///
    /// A failing RPC probe is a [`PolymarketError::Network`]. Without
    /// configured API credentials they are created or derived with the
    /// wallet key; in dry-run mode a failure there only disables the
    /// authenticated read calls.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let rpc = RpcClient::new(config.polygon_rpc())?;
        rpc.probe(config.chain_id()).await?;

        let wallet = Wallet::from_private_key(config.private_key())
            .map_err(|e| PolymarketError::Config(e.to_string()))?;
        let wallet_address = wallet.address().to_string();

        let clob = HttpClob::new(config.clob_url(), config.chain_id(), wallet).map_err(|e| {
            PolymarketError::Config(format!("Failed to initialize CLOB client: {}", e))
        })?;

        let clob = match config.api_credentials() {
            Some(credentials) => {
                tracing::info!("Using configured API credentials");
                clob.with_credentials(credentials.clone())
            }
            None => match clob.create_or_derive_api_creds().await {
                Ok(credentials) => {
                    tracing::info!("Derived API credentials");
                    clob.with_credentials(credentials)
                }
                Err(e) if config.dry_run() => {
                    tracing::warn!(
                        error = %e,
                        "Could not derive API credentials, continuing without"
                    );
                    clob
                }
                Err(e) => {
                    return Err(PolymarketError::Config(format!(
                        "Failed to initialize CLOB client: {}",
                        e
                    )))
                }
            },
        };

        Self::build(config, clob, wallet_address, rpc)
    }
}

impl<C: ClobApi> PolymarketClient<C> {
    /// Assemble a client around an existing CLOB implementation
    ///
    /// The RPC endpoint is not probed.
    pub fn from_parts(
        config: ClientConfig,
        clob: C,
        wallet_address: impl Into<String>,
    ) -> Result<Self> {
        let rpc = RpcClient::new(config.polygon_rpc())?;
        Self::build(config, clob, wallet_address.into(), rpc)
    }

    fn build(
        config: ClientConfig,
        clob: C,
        wallet_address: String,
        rpc: RpcClient,
    ) -> Result<Self> {
        let storage = if config.enable_storage() {
            Some(SqliteStore::open(config.db_path())?)
        } else {
            None
        };

        let mut markets = MarketFetcher::new(GammaClient::with_base_url(config.gamma_url())?);
        if config.enable_cache() {
            markets = markets.with_cache(config.cache_ttl());
        }
        if let Some(storage) = &storage {
            markets = markets.with_storage(storage.clone());
        }

        tracing::info!(
            wallet = %wallet_address,
            dry_run = config.dry_run(),
            cache = config.enable_cache(),
            storage = config.enable_storage(),
            "Polymarket client initialized"
        );

        Ok(Self {
            config,
            wallet_address,
            clob,
            rpc,
            markets,
            storage,
            sizer: PositionSizer::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    pub fn clob(&self) -> &C {
        &self.clob
    }

    pub fn storage(&self) -> Option<&SqliteStore> {
        self.storage.as_ref()
    }

    fn executor(&self) -> OrderExecutor<'_, C> {
        OrderExecutor::new(&self.clob, self.config.mode())
    }

    // Market data

    pub async fn get_markets(
        &mut self,
        query: &MarketQuery,
        use_cache: bool,
    ) -> Result<Vec<MarketRecord>> {
        self.markets.get_markets(query, use_cache).await
    }

    pub async fn get_market_by_id(&self, id: &str) -> Option<MarketRecord> {
        self.markets.get_market_by_id(id).await
    }

    pub async fn search_markets(&mut self, query: &str, limit: usize) -> Result<Vec<MarketRecord>> {
        self.markets.search_markets(query, limit).await
    }

    pub async fn get_orderbook(&self, token_id: &str) -> Result<OrderBookSummary> {
        let book = self
            .clob
            .get_order_book(token_id)
            .await
            .map_err(|e| {
                api_error(&format!("Failed to get orderbook for token {}", token_id), e)
            })?;
        Ok(OrderBookSummary::from_response(token_id, book))
    }

    /// Best price on `side`, 0 on failure
    ///
    /// Positive prices are recorded in storage when it is enabled.
    pub async fn get_price(&self, token_id: &str, side: Side) -> Decimal {
        match self.clob.get_price(token_id, side).await {
            Ok(price) => {
                if price > Decimal::ZERO {
                    if let Some(storage) = &self.storage {
                        storage.save_price(token_id, price, Decimal::ZERO, ORDERBOOK_SOURCE);
                    }
                }
                price
            }
            Err(e) => {
                tracing::warn!(token_id, side = %side, error = %e, "Failed to get price");
                Decimal::ZERO
            }
        }
    }

    /// Mid of best bid and ask, else the last trade price, else 0
    pub async fn get_mid_price(&self, token_id: &str) -> Decimal {
        let book = match self.get_orderbook(token_id).await {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(token_id, error = %e, "Failed to calculate mid price");
                return Decimal::ZERO;
            }
        };

        if let Some(mid) = book.mid_price() {
            return mid;
        }

        self.clob
            .get_last_trade_price(token_id)
            .await
            .unwrap_or_else(|e| {
                tracing::debug!(token_id, error = %e, "No last trade price");
                Decimal::ZERO
            })
    }

    // Orders

    pub async fn create_limit_order(
        &self,
        token_id: &str,
        side: Side,
        size: Decimal,
        price: Decimal,
        order_type: OrderType,
    ) -> Result<Execution> {
        let request = OrderRequest::limit(token_id, side, size, price).with_order_type(order_type);
        self.executor().submit(request).await
    }

    /// Market order for `amount` (USDC for BUY, shares for SELL)
    pub async fn create_market_order(
        &self,
        token_id: &str,
        side: Side,
        amount: Decimal,
    ) -> Result<Execution> {
        self.executor()
            .submit(OrderRequest::market(token_id, side, amount))
            .await
    }

    pub async fn get_orders(&self, market: Option<&str>) -> Vec<OrderInfo> {
        self.executor().get_orders(market).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        self.executor().cancel_order(order_id).await
    }

    pub async fn cancel_all_orders(&self, market: Option<&str>) -> Result<bool> {
        self.executor().cancel_all_orders(market).await
    }

    // Portfolio

    /// USDC balances, zeros on failure
    pub async fn get_balance_info(&self) -> BalanceInfo {
        match self.clob.get_balance_allowance(AssetType::Collateral).await {
            Ok(balance) => {
                let usdc = balance.amount();
                BalanceInfo {
                    usdc_balance: usdc,
                    available_balance: usdc,
                    ..BalanceInfo::zero()
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to get balance info");
                BalanceInfo::zero()
            }
        }
    }

    /// Shares held of one outcome token, 0 on failure
    pub async fn get_token_balance(&self, token_id: &str) -> Decimal {
        let asset = AssetType::Conditional {
            token_id: token_id.to_string(),
        };
        match self.clob.get_balance_allowance(asset).await {
            Ok(balance) => balance.amount(),
            Err(e) => {
                tracing::error!(token_id, error = %e, "Failed to get token balance");
                Decimal::ZERO
            }
        }
    }

    pub fn calculate_position_size(
        &self,
        available_balance: Decimal,
        price: Decimal,
        max_risk_pct: Decimal,
    ) -> Decimal {
        self.sizer.calculate(available_balance, price, max_risk_pct)
    }

    // Maintenance

    pub async fn health_check(&self) -> HealthReport {
        let mut report = HealthReport {
            wallet_address: self.wallet_address.clone(),
            dry_run: self.config.dry_run(),
            chain_id: self.config.chain_id(),
            rpc_connected: false,
            latest_block: None,
            cache_size: self.config.enable_cache().then(|| self.markets.cache_size()),
            storage_stats: self.storage.as_ref().and_then(SqliteStore::stats),
            healthy: false,
            error: None,
        };

        match self.rpc.block_number().await {
            Ok(block) => {
                report.rpc_connected = true;
                report.latest_block = Some(block);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check: RPC unreachable");
                report.error = Some(e.to_string());
            }
        }
        report.healthy = report.rpc_connected;

        report
    }

    pub fn clear_cache(&mut self) {
        self.markets.clear_cache();
    }

    /// Delete stored prices older than `days`; `None` when storage is off
    pub fn cleanup_old_data(&self, days: u32) -> Option<usize> {
        self.storage.as_ref().map(|s| s.cleanup_old_prices(days))
    }
}

/// Map a CLOB failure onto [`PolymarketError::Api`]
fn api_error(context: &str, err: ClobError) -> PolymarketError {
    match err {
        ClobError::Api { status, message } => {
            PolymarketError::api_status(status, format!("{}: {}", context, message))
        }
        other => PolymarketError::api(format!("{}: {}", context, other)),
    }
}
