//! CLOB boundary
//!
//! The order executor and client facade talk to Polymarket's central limit
//! order book through the [`ClobApi`] trait. [`HttpClob`] implements it over
//! the REST API (L1/L2 authentication, EIP-712 order signing); tests swap in
//! their own implementations.

mod auth;
mod http;
mod signing;
mod types;
mod wallet;

pub use auth::{l1_headers, sign_clob_auth, ApiCredentials, L2Auth};
pub use http::HttpClob;
pub use signing::{
    exchange_address, limit_order_amounts, market_order_amounts, sign_order, OrderTerms,
    NEG_RISK_EXCHANGE, STANDARD_EXCHANGE,
};
pub use types::{
    AssetType, BalanceAllowance, BookResponse, CancelResponse, ClobOrderType, MarketOrderArgs,
    OrderArgs, PostOrderResponse, RawLevel, RawOrder, SignedOrder,
};
pub use wallet::Wallet;

use crate::execution::Side;
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from the CLOB boundary
#[derive(Debug, Error)]
pub enum ClobError {
    #[error("CLOB request failed: {0}")]
    Http(String),

    #[error("CLOB returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected CLOB response: {0}")]
    Decode(String),

    #[error("CLOB authentication failed: {0}")]
    Auth(String),

    #[error("Order signing failed: {0}")]
    Signing(String),

    #[error("Invalid wallet key: {0}")]
    Wallet(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

impl From<reqwest::Error> for ClobError {
    fn from(e: reqwest::Error) -> Self {
        ClobError::Http(e.to_string())
    }
}

/// Operations the client needs from the CLOB
#[async_trait]
pub trait ClobApi: Send + Sync {
    /// Build and sign a limit order
    async fn create_order(&self, args: &OrderArgs) -> Result<SignedOrder, ClobError>;

    /// Build and sign a market order
    async fn create_market_order(&self, args: &MarketOrderArgs)
        -> Result<SignedOrder, ClobError>;

    /// Submit a signed order
    async fn post_order(
        &self,
        order: &SignedOrder,
        order_type: ClobOrderType,
    ) -> Result<PostOrderResponse, ClobError>;

    /// Cancel one order
    async fn cancel(&self, order_id: &str) -> Result<CancelResponse, ClobError>;

    /// Cancel every open order
    async fn cancel_all(&self) -> Result<CancelResponse, ClobError>;

    /// Cancel every open order in one market (condition id)
    async fn cancel_market_orders(&self, market: &str) -> Result<CancelResponse, ClobError>;

    /// Open orders, optionally restricted to a market
    async fn get_orders(&self, market: Option<&str>) -> Result<Vec<RawOrder>, ClobError>;

    async fn get_order_book(&self, token_id: &str) -> Result<BookResponse, ClobError>;

    /// Best price on one side of the book
    async fn get_price(&self, token_id: &str, side: Side) -> Result<Decimal, ClobError>;

    async fn get_last_trade_price(&self, token_id: &str) -> Result<Decimal, ClobError>;

    async fn get_balance_allowance(&self, asset: AssetType)
        -> Result<BalanceAllowance, ClobError>;
}
